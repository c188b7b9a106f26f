//! Keyword content filter.
//!
//! Text is flagged when it contains any denylisted term, compared
//! case-insensitively as a plain substring. Flagged content is still stored;
//! the flag only routes it to moderators.

use serde::Serialize;

/// Terms that cause content to be flagged.
pub const DENYLIST: &[&str] = &["badword1", "badword2", "spam", "offensive"];

/// Reason recorded on flagged content.
pub const FLAG_REASON: &str = "Content contains inappropriate language";

/// Outcome of classifying a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Whether a denylisted term was found.
    pub flagged: bool,
    /// Human-readable reason, empty when not flagged.
    pub reason: String,
}

impl Classification {
    fn clean() -> Self {
        Self::default()
    }

    fn flagged() -> Self {
        Self {
            flagged: true,
            reason: FLAG_REASON.to_string(),
        }
    }
}

/// Classify a single text.
///
/// # Examples
///
/// ```
/// use agora::filter::classify;
///
/// assert!(classify("Buy SPAM here").flagged);
/// assert!(!classify("hello world").flagged);
/// assert!(!classify("").flagged);
/// ```
pub fn classify(text: &str) -> Classification {
    if text.is_empty() {
        return Classification::clean();
    }

    let lower = text.to_lowercase();
    if DENYLIST.iter().any(|term| lower.contains(term)) {
        Classification::flagged()
    } else {
        Classification::clean()
    }
}

/// Pick the most relevant field: the first one that is present and non-empty.
pub fn select_text<'a>(fields: &[Option<&'a str>]) -> Option<&'a str> {
    fields.iter().flatten().copied().find(|s| !s.is_empty())
}

/// Classify the first non-empty field (content, else title, else description).
pub fn classify_first(fields: &[Option<&str>]) -> Classification {
    select_text(fields).map(classify).unwrap_or_default()
}
