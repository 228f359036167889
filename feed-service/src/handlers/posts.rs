/// Post handlers - listing, retrieval, authoring, and engagement endpoints
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::{MaybeUser, UserId};
use crate::models::PostSnapshot;
use crate::services::{
    EngagementCommand, EngagementOutcome, EngagementService, NewPost, PostFilter, PostPatch,
    PostService, SortMode, DEFAULT_PAGE_SIZE,
};
use crate::store::{Comment, Store};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

impl AuthorSummary {
    fn lookup(store: &Store, user_id: Uuid) -> Option<Self> {
        store.user_opt(user_id).map(|profile| AuthorSummary {
            id: profile.id,
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub author: Option<AuthorSummary>,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub image: String,
    pub read_time: String,
    pub views: u64,
    pub like_count: usize,
    pub bookmark_count: usize,
    pub comment_count: usize,
    /// Present only when the caller is identified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bookmarked: Option<bool>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    /// Shape a snapshot for the wire, adding caller-relative flags when an
    /// identity is present.
    pub fn build(store: &Store, snap: &PostSnapshot, caller: Option<Uuid>) -> Self {
        let (is_liked, is_bookmarked) = match (caller, store.post(snap.id)) {
            (Some(user), Ok(item)) => (
                Some(item.likes.contains(user)),
                Some(item.bookmarks.contains(user)),
            ),
            _ => (None, None),
        };

        PostResponse {
            id: snap.id,
            author: AuthorSummary::lookup(store, snap.author_id),
            title: snap.title.clone(),
            content: snap.body.clone(),
            excerpt: snap.excerpt.clone(),
            tags: snap.tags.clone(),
            image: snap.image.clone(),
            read_time: format!("{} min read", snap.read_time_minutes()),
            views: snap.views,
            like_count: snap.like_count,
            bookmark_count: snap.bookmark_count,
            comment_count: snap.comment_count,
            is_liked,
            is_bookmarked,
            is_published: snap.published,
            created_at: snap.created_at,
            updated_at: snap.updated_at,
        }
    }

    pub fn build_many(store: &Store, snaps: &[PostSnapshot], caller: Option<Uuid>) -> Vec<Self> {
        snaps
            .iter()
            .map(|snap| PostResponse::build(store, snap, caller))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn build(store: &Store, comment: &Comment) -> Self {
        CommentResponse {
            id: comment.id,
            author: AuthorSummary::lookup(store, comment.author_id),
            content: comment.body.clone(),
            created_at: comment.created_at,
        }
    }
}

fn validate_tags(tags: &Vec<String>) -> std::result::Result<(), ValidationError> {
    if tags.is_empty() {
        let mut err = ValidationError::new("tags");
        err.message = Some("At least one tag is required".into());
        return Err(err);
    }
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || trimmed.chars().count() > 20 {
            let mut err = ValidationError::new("tags");
            err.message = Some("Each tag must be between 1 and 20 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 50, message = "Content must be at least 50 characters"))]
    pub content: String,
    #[validate(length(min = 10, max = 500, message = "Excerpt must be between 10 and 500 characters"))]
    pub excerpt: String,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 50, message = "Content must be at least 50 characters"))]
    pub content: Option<String>,
    #[validate(length(min = 10, max = 500, message = "Excerpt must be between 10 and 500 characters"))]
    pub excerpt: Option<String>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub tag: Option<String>,
    pub author: Option<Uuid>,
    pub sort: Option<String>,
}

/// List published posts with filtering, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses((status = 200, description = "Page of posts with pagination metadata"))
)]
pub async fn list_posts(
    store: web::Data<Arc<Store>>,
    query: web::Query<ListPostsQuery>,
    caller: MaybeUser,
) -> Result<HttpResponse> {
    metrics::RETRIEVAL_REQUESTS
        .with_label_values(&["list_posts"])
        .inc();
    let started = std::time::Instant::now();

    let sort = match query.sort.as_deref() {
        Some(raw) => raw.parse::<SortMode>()?,
        None => SortMode::Newest,
    };
    let filter = PostFilter {
        tag: query.tag.clone(),
        author: query.author,
    };

    let service = PostService::new(store.get_ref().clone());
    let (window, meta) = service.list_posts(
        &filter,
        sort,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    let body = serde_json::json!({
        "status": "success",
        "data": {
            "posts": PostResponse::build_many(store.get_ref(), &window, caller.0),
            "pagination": meta,
        }
    });
    metrics::RETRIEVAL_DURATION_SECONDS
        .with_label_values(&["list_posts"])
        .observe(started.elapsed().as_secs_f64());
    Ok(HttpResponse::Ok().json(body))
}

/// Fetch a single post; each read increments the view counter once.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    store: web::Data<Arc<Store>>,
    post_id: web::Path<Uuid>,
    caller: MaybeUser,
) -> Result<HttpResponse> {
    metrics::RETRIEVAL_REQUESTS
        .with_label_values(&["get_post"])
        .inc();

    let service = PostService::new(store.get_ref().clone());
    let snap = service.read_post(*post_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": { "post": PostResponse::build(store.get_ref(), &snap, caller.0) }
    })))
}

/// Publish a new post authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_post(
    store: web::Data<Arc<Store>>,
    caller: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let body = req.into_inner();

    let service = PostService::new(store.get_ref().clone());
    let item = service.create_post(
        caller.0,
        NewPost {
            title: body.title,
            body: body.content,
            excerpt: body.excerpt,
            tags: body.tags,
            image: body.image,
        },
    )?;
    let snap = item.snapshot();

    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": "success",
        "message": "Post created successfully",
        "data": { "post": PostResponse::build(store.get_ref(), &snap, Some(caller.0)) }
    })))
}

/// Author-only partial update.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    store: web::Data<Arc<Store>>,
    post_id: web::Path<Uuid>,
    caller: UserId,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let body = req.into_inner();

    let service = PostService::new(store.get_ref().clone());
    let item = service.update_post(
        *post_id,
        caller.0,
        PostPatch {
            title: body.title,
            body: body.content,
            excerpt: body.excerpt,
            tags: body.tags,
            image: body.image,
        },
    )?;
    let snap = item.snapshot();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "Post updated successfully",
        "data": { "post": PostResponse::build(store.get_ref(), &snap, Some(caller.0)) }
    })))
}

/// Author-only delete; comments cascade with the post.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post_id}",
    tag = "posts",
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    store: web::Data<Arc<Store>>,
    post_id: web::Path<Uuid>,
    caller: UserId,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    service.delete_post(*post_id, caller.0)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "Post deleted successfully"
    })))
}

/// Toggle the caller's like on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/like",
    tag = "posts",
    responses(
        (status = 200, description = "Toggle applied"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Concurrent toggle retries exhausted")
    )
)]
pub async fn toggle_like(
    store: web::Data<Arc<Store>>,
    post_id: web::Path<Uuid>,
    caller: UserId,
) -> Result<HttpResponse> {
    metrics::ENGAGEMENT_TOGGLES
        .with_label_values(&["like"])
        .inc();

    let service = EngagementService::new(store.get_ref().clone());
    let outcome = service.execute(EngagementCommand::ToggleLike {
        post_id: *post_id,
        user_id: caller.0,
    })?;

    match outcome {
        EngagementOutcome::Toggled { active, count } => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "status": "success",
                "message": if active { "Post liked" } else { "Post unliked" },
                "data": { "isLiked": active, "likeCount": count }
            })))
        }
        _ => Err(AppError::Internal("unexpected engagement outcome".into())),
    }
}

/// Toggle the caller's bookmark on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/bookmark",
    tag = "posts",
    responses(
        (status = 200, description = "Toggle applied"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Concurrent toggle retries exhausted")
    )
)]
pub async fn toggle_bookmark(
    store: web::Data<Arc<Store>>,
    post_id: web::Path<Uuid>,
    caller: UserId,
) -> Result<HttpResponse> {
    metrics::ENGAGEMENT_TOGGLES
        .with_label_values(&["bookmark"])
        .inc();

    let service = EngagementService::new(store.get_ref().clone());
    let outcome = service.execute(EngagementCommand::ToggleBookmark {
        post_id: *post_id,
        user_id: caller.0,
    })?;

    match outcome {
        EngagementOutcome::Toggled { active, count } => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "status": "success",
                "message": if active { "Post bookmarked" } else { "Post unbookmarked" },
                "data": { "isBookmarked": active, "bookmarkCount": count }
            })))
        }
        _ => Err(AppError::Internal("unexpected engagement outcome".into())),
    }
}

/// Append a comment to a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{post_id}/comment",
    tag = "posts",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn add_comment(
    store: web::Data<Arc<Store>>,
    post_id: web::Path<Uuid>,
    caller: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    metrics::ENGAGEMENT_TOGGLES
        .with_label_values(&["comment"])
        .inc();

    let service = EngagementService::new(store.get_ref().clone());
    let outcome = service.execute(EngagementCommand::AppendComment {
        post_id: *post_id,
        author_id: caller.0,
        body: req.into_inner().content,
    })?;

    match outcome {
        EngagementOutcome::Commented { comment, count } => {
            Ok(HttpResponse::Created().json(serde_json::json!({
                "status": "success",
                "message": "Comment added successfully",
                "data": {
                    "comment": CommentResponse::build(store.get_ref(), &comment),
                    "commentCount": count,
                }
            })))
        }
        _ => Err(AppError::Internal("unexpected engagement outcome".into())),
    }
}
