//! Database schema and migrations for Agora.
//!
//! Migrations are applied in order when the database is opened; the
//! schema_version table records how far a given file has been upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed inside its own transaction.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
-- Registered accounts
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password    TEXT NOT NULL,                   -- Argon2 hash
    role        TEXT NOT NULL DEFAULT 'user'
                CHECK (role IN ('user', 'moderator', 'admin')),
    post_count  INTEGER NOT NULL DEFAULT 0,
    reputation  INTEGER NOT NULL DEFAULT 0,
    bio         TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX idx_users_role ON users(role);
"#,
    // v2: topics
    r#"
-- Discussion topics; rows are soft-deleted, never removed
CREATE TABLE topics (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    title               TEXT NOT NULL,
    description         TEXT NOT NULL,
    author_id           INTEGER NOT NULL REFERENCES users(id),
    category            TEXT NOT NULL DEFAULT 'General',
    tags                TEXT NOT NULL DEFAULT '[]',     -- JSON array of strings
    view_count          INTEGER NOT NULL DEFAULT 0,
    post_count          INTEGER NOT NULL DEFAULT 0,     -- no floor, may go negative
    is_pinned           INTEGER NOT NULL DEFAULT 0,
    is_locked           INTEGER NOT NULL DEFAULT 0,
    is_deleted          INTEGER NOT NULL DEFAULT 0,
    is_moderated        INTEGER NOT NULL DEFAULT 0,
    moderation_reason   TEXT NOT NULL DEFAULT '',
    moderated_by        INTEGER REFERENCES users(id),
    last_activity       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    last_post_by        INTEGER REFERENCES users(id),
    created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX idx_topics_listing ON topics(is_deleted, is_pinned DESC, last_activity DESC);
CREATE INDEX idx_topics_category ON topics(category);
CREATE INDEX idx_topics_author ON topics(author_id);
"#,
    // v3: posts, likes and reports
    r#"
-- Posts form a tree through parent_post_id
CREATE TABLE posts (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    content             TEXT NOT NULL,
    author_id           INTEGER NOT NULL REFERENCES users(id),
    topic_id            INTEGER NOT NULL REFERENCES topics(id),
    parent_post_id      INTEGER REFERENCES posts(id),
    level               INTEGER NOT NULL DEFAULT 0 CHECK (level >= 0),
    like_count          INTEGER NOT NULL DEFAULT 0,
    is_reported         INTEGER NOT NULL DEFAULT 0,
    is_deleted          INTEGER NOT NULL DEFAULT 0,
    deleted_at          TEXT,
    deleted_by          INTEGER REFERENCES users(id),
    is_moderated        INTEGER NOT NULL DEFAULT 0,
    moderation_reason   TEXT NOT NULL DEFAULT '',
    created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX idx_posts_topic ON posts(topic_id, parent_post_id, is_deleted, created_at);
CREATE INDEX idx_posts_parent ON posts(parent_post_id);
CREATE INDEX idx_posts_reported ON posts(is_reported, is_deleted);

-- Like set; the primary key makes a second like by the same user impossible
CREATE TABLE post_likes (
    post_id     INTEGER NOT NULL REFERENCES posts(id),
    user_id     INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    PRIMARY KEY (post_id, user_id)
);

-- Reports, at most one per (post, reporter)
CREATE TABLE post_reports (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id     INTEGER NOT NULL REFERENCES posts(id),
    reported_by INTEGER NOT NULL REFERENCES users(id),
    reason      TEXT NOT NULL,
    reported_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE (post_id, reported_by)
);

CREATE INDEX idx_post_reports_post ON post_reports(post_id, reported_at);
"#,
];
