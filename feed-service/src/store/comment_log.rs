/// CommentLog - append-only, insertion-ordered comments on a content item
///
/// The log is owned by its parent item and dies with it. There is no edit or
/// delete; `len()` is the comment count, never cached elsewhere.
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct CommentLog {
    entries: RwLock<Vec<Comment>>,
}

impl CommentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a comment. Body must be 1..=1000 chars.
    pub fn append(&self, author_id: Uuid, body: &str) -> Result<Comment> {
        let len = body.chars().count();
        if len == 0 || len > MAX_COMMENT_LEN {
            return Err(AppError::validation(
                "content",
                "Comment must be between 1 and 1000 characters",
            ));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            author_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.push(comment.clone());
        Ok(comment)
    }

    /// All comments in insertion order. Re-reading yields the same sequence
    /// as long as no append happened in between.
    pub fn all(&self) -> Vec<Comment> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_insertion_order() {
        let log = CommentLog::new();
        let author = Uuid::new_v4();

        log.append(author, "first").unwrap();
        log.append(author, "second").unwrap();
        log.append(author, "third").unwrap();

        let bodies: Vec<String> = log.all().into_iter().map(|c| c.body).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn rereading_is_stable() {
        let log = CommentLog::new();
        log.append(Uuid::new_v4(), "only").unwrap();

        let first: Vec<Uuid> = log.all().into_iter().map(|c| c.id).collect();
        let second: Vec<Uuid> = log.all().into_iter().map(|c| c.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_out_of_range_bodies() {
        let log = CommentLog::new();
        let author = Uuid::new_v4();

        assert!(log.append(author, "").is_err());
        assert!(log.append(author, &"x".repeat(1001)).is_err());
        assert!(log.append(author, &"x".repeat(1000)).is_ok());
        assert_eq!(log.len(), 1);
    }
}
