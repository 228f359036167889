/// Domain models for feed-service
///
/// ContentItem owns its engagement state (likes, bookmarks, comments); the
/// author reference points at a UserProfile owned by the store. Derived
/// values (counts, read time) are computed from owned state on demand and
/// never stored where they could drift.
use crate::error::{AppError, Result};
use crate::store::{CommentLog, RelationshipSet};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

pub mod tags;

/// Image applied when a post is created without one.
pub const DEFAULT_POST_IMAGE: &str =
    "https://images.unsplash.com/photo-1633356122544-f134324a6cee?w=800&h=400&fit=crop";

/// Average reading speed used for the derived read time.
const WORDS_PER_MINUTE: usize = 200;

/// Author-editable fields of a content item. Guarded by one lock so an edit
/// is observed whole or not at all.
#[derive(Debug, Clone)]
pub struct ContentDoc {
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub image: String,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// A published (or draft) content item.
#[derive(Debug)]
pub struct ContentItem {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    doc: RwLock<ContentDoc>,
    views: AtomicU64,
    pub likes: RelationshipSet,
    pub bookmarks: RelationshipSet,
    pub comments: CommentLog,
}

impl ContentItem {
    pub fn new(author_id: Uuid, doc: ContentDoc) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            created_at: Utc::now(),
            doc: RwLock::new(doc),
            views: AtomicU64::new(0),
            likes: RelationshipSet::new(),
            bookmarks: RelationshipSet::new(),
            comments: CommentLog::new(),
        }
    }

    /// Consistent copy of the editable fields.
    pub fn doc(&self) -> ContentDoc {
        self.doc.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply an author edit under the document lock.
    pub fn update_doc(&self, apply: impl FnOnce(&mut ContentDoc)) {
        let mut doc = self.doc.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut doc);
        doc.updated_at = Utc::now();
    }

    /// Record one read. Commutative, so a plain atomic increment suffices.
    pub fn record_view(&self) -> u64 {
        self.views.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn views(&self) -> u64 {
        self.views.load(Ordering::Relaxed)
    }

    /// Ownership-check primitive; blocking is enforced at the handler
    /// boundary.
    pub fn ensure_owned_by(&self, user_id: Uuid) -> Result<()> {
        if self.author_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Only the author can modify this post".to_string(),
            ))
        }
    }

    /// Point-in-time copy used by ranking, search, and serialization.
    pub fn snapshot(&self) -> PostSnapshot {
        let doc = self.doc();
        PostSnapshot {
            id: self.id,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: doc.updated_at,
            title: doc.title,
            body: doc.body,
            excerpt: doc.excerpt,
            tags: doc.tags,
            image: doc.image,
            published: doc.published,
            views: self.views(),
            like_count: self.likes.len(),
            bookmark_count: self.bookmarks.len(),
            comment_count: self.comments.len(),
        }
    }
}

/// Immutable view of a content item plus its engagement counts, taken at a
/// single point in time.
#[derive(Debug, Clone)]
pub struct PostSnapshot {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub image: String,
    pub published: bool,
    pub views: u64,
    pub like_count: usize,
    pub bookmark_count: usize,
    pub comment_count: usize,
}

impl PostSnapshot {
    /// Derived read time in minutes: ceil(word count / 200). Recomputed from
    /// the body on every call so it can never desync.
    pub fn read_time_minutes(&self) -> u64 {
        read_time_minutes(&self.body)
    }
}

/// ceil(word_count / WORDS_PER_MINUTE), minimum of 1 for any non-empty body.
pub fn read_time_minutes(body: &str) -> u64 {
    let words = body.split_whitespace().count();
    (words as u64).div_ceil(WORDS_PER_MINUTE as u64)
}

/// A registered user.
#[derive(Debug)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub followers: RelationshipSet,
    pub following: RelationshipSet,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar: avatar.into(),
            bio: bio.into(),
            followers: RelationshipSet::new(),
            following: RelationshipSet::new(),
        }
    }

    /// Views over the sets; never stored independently.
    pub fn follower_count(&self) -> usize {
        self.followers.len()
    }

    pub fn following_count(&self) -> usize {
        self.following.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_time_rounds_up() {
        let body = vec!["word"; 500].join(" ");
        assert_eq!(read_time_minutes(&body), 3);

        let body = vec!["word"; 200].join(" ");
        assert_eq!(read_time_minutes(&body), 1);

        let body = vec!["word"; 201].join(" ");
        assert_eq!(read_time_minutes(&body), 2);

        assert_eq!(read_time_minutes(""), 0);
    }

    #[test]
    fn snapshot_reflects_engagement_counts() {
        let author = Uuid::new_v4();
        let item = ContentItem::new(
            author,
            ContentDoc {
                title: "Hello world".to_string(),
                body: "body text that is long enough to publish without fuss".to_string(),
                excerpt: "an excerpt".to_string(),
                tags: vec!["rust".to_string()],
                image: DEFAULT_POST_IMAGE.to_string(),
                published: true,
                updated_at: Utc::now(),
            },
        );

        item.likes.toggle(Uuid::new_v4()).unwrap();
        item.bookmarks.toggle(Uuid::new_v4()).unwrap();
        item.comments.append(Uuid::new_v4(), "nice").unwrap();
        item.record_view();
        item.record_view();

        let snap = item.snapshot();
        assert_eq!(snap.like_count, 1);
        assert_eq!(snap.bookmark_count, 1);
        assert_eq!(snap.comment_count, 1);
        assert_eq!(snap.views, 2);
    }

    #[test]
    fn update_doc_touches_updated_at() {
        let item = ContentItem::new(
            Uuid::new_v4(),
            ContentDoc {
                title: "Original title".to_string(),
                body: "original body long enough for the minimum length rule".to_string(),
                excerpt: "an excerpt".to_string(),
                tags: vec!["rust".to_string()],
                image: DEFAULT_POST_IMAGE.to_string(),
                published: true,
                updated_at: Utc::now(),
            },
        );
        let before = item.doc().updated_at;

        item.update_doc(|doc| doc.title = "New title".to_string());

        let doc = item.doc();
        assert_eq!(doc.title, "New title");
        assert!(doc.updated_at >= before);
    }
}
