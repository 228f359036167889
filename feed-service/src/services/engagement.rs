/// Engagement commands - like, bookmark, and comment mutations
///
/// Mutations are expressed as explicit command objects executed against the
/// store, so the compare-and-apply discipline lives in one place instead of
/// being re-implemented per call site. Each command either completes fully
/// or leaves no observable change.
use crate::error::Result;
use crate::store::{Comment, Store};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum EngagementCommand {
    ToggleLike { post_id: Uuid, user_id: Uuid },
    ToggleBookmark { post_id: Uuid, user_id: Uuid },
    AppendComment { post_id: Uuid, author_id: Uuid, body: String },
}

#[derive(Debug, Clone)]
pub enum EngagementOutcome {
    /// Membership flip on a relationship set, with the post-toggle count.
    Toggled { active: bool, count: usize },
    /// Newly appended comment plus the updated comment count.
    Commented { comment: Comment, count: usize },
}

pub struct EngagementService {
    store: Arc<Store>,
}

impl EngagementService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn execute(&self, command: EngagementCommand) -> Result<EngagementOutcome> {
        match command {
            EngagementCommand::ToggleLike { post_id, user_id } => {
                let post = self.store.post(post_id)?;
                let (active, count) = post.likes.toggle(user_id)?;
                tracing::debug!(%post_id, %user_id, active, "like toggled");
                Ok(EngagementOutcome::Toggled { active, count })
            }
            EngagementCommand::ToggleBookmark { post_id, user_id } => {
                let post = self.store.post(post_id)?;
                let (active, count) = post.bookmarks.toggle(user_id)?;
                tracing::debug!(%post_id, %user_id, active, "bookmark toggled");
                Ok(EngagementOutcome::Toggled { active, count })
            }
            EngagementCommand::AppendComment {
                post_id,
                author_id,
                body,
            } => {
                let post = self.store.post(post_id)?;
                let comment = post.comments.append(author_id, &body)?;
                Ok(EngagementOutcome::Commented {
                    comment,
                    count: post.comments.len(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ContentDoc, ContentItem, UserProfile, DEFAULT_POST_IMAGE};
    use chrono::Utc;

    fn seeded() -> (EngagementService, Arc<Store>, Uuid, Uuid) {
        let store = Store::new();
        let author = store.register_user(UserProfile::new("ada", "", ""));
        let reader = store.register_user(UserProfile::new("grace", "", ""));
        let post = store.insert_post(ContentItem::new(
            author.id,
            ContentDoc {
                title: "A title of size".to_string(),
                body: "a body easily long enough to satisfy the fifty character floor".to_string(),
                excerpt: "excerpt".to_string(),
                tags: vec!["rust".to_string()],
                image: DEFAULT_POST_IMAGE.to_string(),
                published: true,
                updated_at: Utc::now(),
            },
        ));
        (
            EngagementService::new(Arc::clone(&store)),
            store,
            post.id,
            reader.id,
        )
    }

    #[test]
    fn like_toggle_round_trips() {
        let (service, store, post_id, user_id) = seeded();

        match service
            .execute(EngagementCommand::ToggleLike { post_id, user_id })
            .unwrap()
        {
            EngagementOutcome::Toggled { active, count } => {
                assert!(active);
                assert_eq!(count, 1);
            }
            _ => panic!("expected toggle outcome"),
        }

        match service
            .execute(EngagementCommand::ToggleLike { post_id, user_id })
            .unwrap()
        {
            EngagementOutcome::Toggled { active, count } => {
                assert!(!active);
                assert_eq!(count, 0);
            }
            _ => panic!("expected toggle outcome"),
        }

        assert_eq!(store.post(post_id).unwrap().likes.len(), 0);
    }

    #[test]
    fn comment_count_tracks_the_log() {
        let (service, store, post_id, user_id) = seeded();

        let outcome = service
            .execute(EngagementCommand::AppendComment {
                post_id,
                author_id: user_id,
                body: "first!".to_string(),
            })
            .unwrap();
        match outcome {
            EngagementOutcome::Commented { count, comment } => {
                assert_eq!(count, 1);
                assert_eq!(comment.body, "first!");
            }
            _ => panic!("expected comment outcome"),
        }

        let post = store.post(post_id).unwrap();
        assert_eq!(post.comments.len(), 1);
    }

    #[test]
    fn commands_against_missing_posts_are_not_found() {
        let (service, _store, _post_id, user_id) = seeded();
        let result = service.execute(EngagementCommand::ToggleLike {
            post_id: Uuid::new_v4(),
            user_id,
        });
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn oversized_comment_is_rejected_without_side_effects() {
        let (service, store, post_id, user_id) = seeded();
        let result = service.execute(EngagementCommand::AppendComment {
            post_id,
            author_id: user_id,
            body: "x".repeat(1001),
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.post(post_id).unwrap().comments.len(), 0);
    }
}
