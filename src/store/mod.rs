//! Durable archives for published posts and review drafts.
//!
//! Both archives are JSON files under the data directory, newest entry
//! first. The wrapper types mirror the on-disk schema exactly; every
//! field a post carries is derived once at publish time and stored, so
//! readers never recompute slugs or excerpts.

pub mod manager;

pub use manager::{StoreError, StoreManager, StoreResult};

use serde::{Deserialize, Serialize};

/// A published entry in the post archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Stable identifier, `post-<unix-millis>` for pipeline-created posts.
    pub id: String,
    pub title: String,
    /// URL-safe slug; falls back to the id for titles with no ASCII.
    pub slug: String,
    /// First 140 characters of the stripped content.
    pub excerpt: String,
    pub content: String,
    /// Pillar the topic was drawn from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pillar: Option<String>,
    pub published: bool,
    /// RFC 3339 local timestamp; the date prefix drives cadence counting.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A queued entry in the review archive, awaiting a human editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Stable identifier, `draft-<unix-millis>`.
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub date: String,
}

/// On-disk shape of `posts.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostArchive {
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// On-disk shape of `drafts.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftArchive {
    #[serde(default)]
    pub drafts: Vec<Draft>,
}

impl PostArchive {
    /// Insert a post at the front, keeping the newest-first ordering.
    pub fn push_front(&mut self, post: Post) {
        self.posts.insert(0, post);
    }
}

impl DraftArchive {
    /// Insert a draft at the front, keeping the newest-first ordering.
    pub fn push_front(&mut self, draft: Draft) {
        self.drafts.insert(0, draft);
    }
}
