/// Post service - creation, retrieval, editing, and filtered listings
use crate::error::{AppError, Result};
use crate::models::{tags, ContentDoc, ContentItem, PostSnapshot, DEFAULT_POST_IMAGE};
use crate::services::pagination::{self, PageMeta};
use crate::services::ranking::{self, SortMode};
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Validated input for creating a post. Field-shape validation happens at
/// the boundary; invariants owned by the domain (tag normalization, image
/// default) are applied here.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

/// Partial author edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
}

/// Filters applied before ranking.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub author: Option<Uuid>,
}

pub struct PostService {
    store: Arc<Store>,
}

impl PostService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Create a published post for `author_id`.
    pub fn create_post(&self, author_id: Uuid, input: NewPost) -> Result<Arc<ContentItem>> {
        // The author reference must resolve before we accept content for it.
        self.store.user(author_id)?;

        let normalized = tags::normalize_tags(&input.tags);
        if normalized.is_empty() {
            return Err(AppError::validation("tags", "At least one tag is required"));
        }

        let item = ContentItem::new(
            author_id,
            ContentDoc {
                title: input.title,
                body: input.body,
                excerpt: input.excerpt,
                tags: normalized,
                image: input.image.unwrap_or_else(|| DEFAULT_POST_IMAGE.to_string()),
                published: true,
                updated_at: Utc::now(),
            },
        );

        let item = self.store.insert_post(item);
        tracing::info!(post_id = %item.id, author_id = %author_id, "post created");
        Ok(item)
    }

    /// Author-only partial update. A body change re-derives the read time by
    /// construction, since read time is never stored.
    pub fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        patch: PostPatch,
    ) -> Result<Arc<ContentItem>> {
        let item = self.store.post(post_id)?;
        item.ensure_owned_by(author_id)?;

        let normalized = match patch.tags {
            Some(raw) => {
                let normalized = tags::normalize_tags(&raw);
                if normalized.is_empty() {
                    return Err(AppError::validation("tags", "At least one tag is required"));
                }
                Some(normalized)
            }
            None => None,
        };

        item.update_doc(|doc| {
            if let Some(title) = patch.title {
                doc.title = title;
            }
            if let Some(body) = patch.body {
                doc.body = body;
            }
            if let Some(excerpt) = patch.excerpt {
                doc.excerpt = excerpt;
            }
            if let Some(tags) = normalized {
                doc.tags = tags;
            }
            if let Some(image) = patch.image {
                doc.image = image;
            }
        });

        tracing::info!(post_id = %post_id, "post updated");
        Ok(item)
    }

    /// Author-only delete; the owned comment log cascades with the item.
    pub fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<()> {
        let item = self.store.post(post_id)?;
        item.ensure_owned_by(author_id)?;
        self.store.remove_post(post_id)?;
        tracing::info!(post_id = %post_id, "post deleted");
        Ok(())
    }

    /// Single-item read: increments the view counter exactly once and
    /// returns the snapshot taken after the increment.
    pub fn read_post(&self, post_id: Uuid) -> Result<PostSnapshot> {
        let item = self.store.post(post_id)?;
        item.record_view();
        Ok(item.snapshot())
    }

    /// Snapshot without the view side effect, for mutation responses.
    pub fn peek_post(&self, post_id: Uuid) -> Result<PostSnapshot> {
        Ok(self.store.post(post_id)?.snapshot())
    }

    /// Published posts matching `filter`, ordered by `sort`, paginated.
    pub fn list_posts(
        &self,
        filter: &PostFilter,
        sort: SortMode,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<PostSnapshot>, PageMeta)> {
        let mut items = self.filtered_published(filter);
        ranking::order(&mut items, sort);
        pagination::paginate(&items, page, limit)
    }

    /// Published posts the given user has liked (newest first).
    pub fn liked_posts(
        &self,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<PostSnapshot>, PageMeta)> {
        self.engagement_listing(page, limit, |item| item.likes.contains(user_id))
    }

    /// Published posts the given user has bookmarked (newest first).
    pub fn bookmarked_posts(
        &self,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<PostSnapshot>, PageMeta)> {
        self.engagement_listing(page, limit, |item| item.bookmarks.contains(user_id))
    }

    /// Published snapshots with the request filters applied. Tag filters go
    /// through the same normalization as stored tags.
    pub fn filtered_published(&self, filter: &PostFilter) -> Vec<PostSnapshot> {
        let tag = filter.tag.as_deref().and_then(tags::normalize_tag);
        self.store.snapshots(|snap| {
            if !snap.published {
                return false;
            }
            if let Some(tag) = &tag {
                if !snap.tags.iter().any(|t| t == tag) {
                    return false;
                }
            }
            if let Some(author) = filter.author {
                if snap.author_id != author {
                    return false;
                }
            }
            true
        })
    }

    fn engagement_listing(
        &self,
        page: i64,
        limit: i64,
        keep: impl Fn(&Arc<ContentItem>) -> bool,
    ) -> Result<(Vec<PostSnapshot>, PageMeta)> {
        let mut items: Vec<PostSnapshot> = self
            .store
            .published_snapshots()
            .into_iter()
            .filter_map(|snap| {
                let item = self.store.post(snap.id).ok()?;
                keep(&item).then_some(snap)
            })
            .collect();
        ranking::order(&mut items, SortMode::Newest);
        pagination::paginate(&items, page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;

    fn service_with_author() -> (PostService, Uuid) {
        let store = Store::new();
        let author = store.register_user(UserProfile::new("ada", "", ""));
        (PostService::new(store), author.id)
    }

    fn valid_input(tags: &[&str]) -> NewPost {
        NewPost {
            title: "A title that is long enough".to_string(),
            body: "a body easily long enough to satisfy the fifty character content floor"
                .to_string(),
            excerpt: "a short excerpt".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image: None,
        }
    }

    #[test]
    fn create_normalizes_tags_and_defaults_image() {
        let (service, author) = service_with_author();
        let item = service
            .create_post(author, valid_input(&[" Rust ", "WEB", "rust"]))
            .unwrap();

        let doc = item.doc();
        assert_eq!(doc.tags, vec!["rust".to_string(), "web".to_string()]);
        assert_eq!(doc.image, DEFAULT_POST_IMAGE);
        assert!(doc.published);
    }

    #[test]
    fn create_requires_a_known_author_and_a_tag() {
        let (service, author) = service_with_author();

        assert!(matches!(
            service.create_post(Uuid::new_v4(), valid_input(&["rust"])),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.create_post(author, valid_input(&["  "])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_is_author_only() {
        let (service, author) = service_with_author();
        let item = service.create_post(author, valid_input(&["rust"])).unwrap();

        let stranger = Uuid::new_v4();
        let patch = PostPatch {
            title: Some("Hijacked title here".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_post(item.id, stranger, patch.clone()),
            Err(AppError::Authorization(_))
        ));

        service.update_post(item.id, author, patch).unwrap();
        assert_eq!(item.doc().title, "Hijacked title here");
    }

    #[test]
    fn read_post_counts_each_read_once() {
        let (service, author) = service_with_author();
        let item = service.create_post(author, valid_input(&["rust"])).unwrap();

        let first = service.read_post(item.id).unwrap();
        let second = service.read_post(item.id).unwrap();
        assert_eq!(first.views, 1);
        assert_eq!(second.views, 2);
    }

    #[test]
    fn tag_filter_normalizes_the_query_side() {
        let (service, author) = service_with_author();
        service.create_post(author, valid_input(&["rust"])).unwrap();
        service.create_post(author, valid_input(&["python"])).unwrap();

        let filter = PostFilter {
            tag: Some("  RUST ".to_string()),
            ..Default::default()
        };
        let (window, meta) = service
            .list_posts(&filter, SortMode::Newest, 1, 10)
            .unwrap();
        assert_eq!(meta.total_items, 1);
        assert_eq!(window[0].tags, vec!["rust".to_string()]);
    }

    #[test]
    fn delete_cascades_comments_but_not_profile() {
        let (service, author) = service_with_author();
        let item = service.create_post(author, valid_input(&["rust"])).unwrap();
        item.comments.append(author, "a comment").unwrap();

        service.delete_post(item.id, author).unwrap();
        assert!(matches!(
            service.read_post(item.id),
            Err(AppError::NotFound(_))
        ));
    }
}
