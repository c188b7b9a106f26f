//! Reply tree assembly.
//!
//! Storage is flat: each post only knows its parent. A page of top-level
//! posts and the live descendants of that page are turned into nested
//! nodes by indexing children under their parent ID and attaching them
//! recursively.

use std::collections::HashMap;

use super::types::Post;

/// A post with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNode {
    /// The post itself.
    pub post: Post,
    /// Direct replies, oldest first, each with its own replies.
    pub replies: Vec<ThreadNode>,
}

/// Build reply trees for `roots` from a flat list of their descendants.
///
/// Children keep the order they appear in `descendants`. Posts whose parent
/// is not among `roots` or `descendants` are dropped.
pub fn build_tree(roots: Vec<Post>, descendants: Vec<Post>) -> Vec<ThreadNode> {
    let mut children: HashMap<i64, Vec<Post>> = HashMap::new();
    for post in descendants {
        if let Some(parent_id) = post.parent_post_id {
            children.entry(parent_id).or_default().push(post);
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

fn attach(post: Post, children: &mut HashMap<i64, Vec<Post>>) -> ThreadNode {
    let replies = children
        .remove(&post.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, children))
        .collect();
    ThreadNode { post, replies }
}
