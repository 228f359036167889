/// In-memory entity store
///
/// An explicit context object passed into every service, replacing any
/// global connection singleton. Durable persistence is an external
/// collaborator; this process-local store is the system of record for the
/// retrieval and engagement pipeline.
use crate::error::{AppError, Result};
use crate::models::{ContentItem, PostSnapshot, UserProfile};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

mod comment_log;
mod relationship;

pub use comment_log::{Comment, CommentLog, MAX_COMMENT_LEN};
pub use relationship::RelationshipSet;

#[derive(Default)]
pub struct Store {
    posts: DashMap<Uuid, Arc<ContentItem>>,
    users: DashMap<Uuid, Arc<UserProfile>>,
}

impl Store {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ---- content items ----

    pub fn insert_post(&self, item: ContentItem) -> Arc<ContentItem> {
        let item = Arc::new(item);
        self.posts.insert(item.id, Arc::clone(&item));
        item
    }

    pub fn post(&self, id: Uuid) -> Result<Arc<ContentItem>> {
        self.posts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Remove a post. The owned comment log goes with it; the author's
    /// profile sets are untouched.
    pub fn remove_post(&self, id: Uuid) -> Result<()> {
        self.posts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Point-in-time snapshots of every post that passes `keep`.
    pub fn snapshots(&self, keep: impl Fn(&PostSnapshot) -> bool) -> Vec<PostSnapshot> {
        self.posts
            .iter()
            .map(|entry| entry.value().snapshot())
            .filter(|snap| keep(snap))
            .collect()
    }

    /// Snapshots of published posts only — the corpus every public listing,
    /// search, and aggregation runs over.
    pub fn published_snapshots(&self) -> Vec<PostSnapshot> {
        self.snapshots(|snap| snap.published)
    }

    // ---- user profiles ----

    /// Registration itself happens outside this core; the store exposes it
    /// for bootstrap and tests.
    pub fn register_user(&self, profile: UserProfile) -> Arc<UserProfile> {
        let profile = Arc::new(profile);
        self.users.insert(profile.id, Arc::clone(&profile));
        profile
    }

    pub fn user(&self, id: Uuid) -> Result<Arc<UserProfile>> {
        self.users
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub fn user_opt(&self, id: Uuid) -> Option<Arc<UserProfile>> {
        self.users.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// All profiles, for user-side search.
    pub fn user_profiles(&self) -> Vec<Arc<UserProfile>> {
        self.users
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentDoc, DEFAULT_POST_IMAGE};
    use chrono::Utc;

    fn sample_doc(published: bool) -> ContentDoc {
        ContentDoc {
            title: "A title of size".to_string(),
            body: "a body easily long enough to satisfy the fifty character floor".to_string(),
            excerpt: "a short excerpt".to_string(),
            tags: vec!["rust".to_string()],
            image: DEFAULT_POST_IMAGE.to_string(),
            published,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_entities_are_not_found() {
        let store = Store::new();
        assert!(matches!(
            store.post(Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.user(Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn published_snapshots_skip_drafts() {
        let store = Store::new();
        let author = store.register_user(UserProfile::new("ada", "", ""));
        store.insert_post(ContentItem::new(author.id, sample_doc(true)));
        store.insert_post(ContentItem::new(author.id, sample_doc(false)));

        assert_eq!(store.published_snapshots().len(), 1);
    }

    #[test]
    fn remove_post_cascades_ownership() {
        let store = Store::new();
        let author = store.register_user(UserProfile::new("ada", "", ""));
        let post = store.insert_post(ContentItem::new(author.id, sample_doc(true)));
        post.comments.append(author.id, "comment").unwrap();

        store.remove_post(post.id).unwrap();
        assert!(store.post(post.id).is_err());
        // The author's profile is unaffected by content deletion.
        assert!(store.user(author.id).is_ok());
    }
}
