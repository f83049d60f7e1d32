//! Publisher: turns an accepted draft into durable archive state.
//!
//! Everything a stored entry carries (id, slug, excerpt, timestamp) is
//! derived here, exactly once, at commit time. The publisher is the only
//! stage that writes to the archives.

use chrono::{DateTime, Local};
use tracing::info;

use crate::quality::text;
use crate::store::{Draft, Post, StoreManager, StoreResult};

/// Characters of stripped content kept as the excerpt.
const EXCERPT_CHARS: usize = 140;

/// Writes accepted content into the post or draft archive.
pub struct Publisher<'a> {
    store: &'a StoreManager,
}

impl<'a> Publisher<'a> {
    pub fn new(store: &'a StoreManager) -> Self {
        Self { store }
    }

    /// Commit a post to the archive, newest first, and persist the store.
    ///
    /// The id is derived from the publish instant, so retrying a failed
    /// commit produces a new id; de-duplication belongs to the quality
    /// gate, which must re-run before any retry.
    pub fn publish(
        &self,
        title: &str,
        content: &str,
        pillar: Option<String>,
        now: DateTime<Local>,
    ) -> StoreResult<Post> {
        let id = format!("post-{}", now.timestamp_millis());
        let post = Post {
            slug: slug_or_id(title, &id),
            id,
            title: title.to_string(),
            excerpt: text::excerpt(content, EXCERPT_CHARS),
            content: content.to_string(),
            pillar,
            published: true,
            date: now.to_rfc3339(),
            image: None,
        };

        let mut archive = self.store.load_posts()?;
        archive.push_front(post.clone());
        self.store.save_posts(&archive)?;

        info!(id = %post.id, slug = %post.slug, "post published");
        Ok(post)
    }

    /// Queue a draft for manual review instead of publishing it.
    pub fn draft(&self, title: &str, content: &str, now: DateTime<Local>) -> StoreResult<Draft> {
        let id = format!("draft-{}", now.timestamp_millis());
        let draft = Draft {
            slug: slug_or_id(title, &id),
            id,
            title: title.to_string(),
            excerpt: text::excerpt(content, EXCERPT_CHARS),
            content: content.to_string(),
            date: now.to_rfc3339(),
        };

        let mut archive = self.store.load_drafts()?;
        archive.push_front(draft.clone());
        self.store.save_drafts(&archive)?;

        info!(id = %draft.id, "draft queued for review");
        Ok(draft)
    }
}

/// Slug for a title, falling back to the entry id when the title has no
/// ASCII alphanumerics at all.
fn slug_or_id(title: &str, id: &str) -> String {
    let slug = text::slugify(title);
    if slug.is_empty() {
        id.to_string()
    } else {
        slug
    }
}
