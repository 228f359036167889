/// User handlers - profiles, follow graph, and per-user post listings
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::{MaybeUser, UserId};
use crate::models::UserProfile;
use crate::services::{FollowService, PostFilter, PostService, SortMode, DEFAULT_PAGE_SIZE};
use crate::store::Store;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::posts::PostResponse;

/// Profile summary used by follower/following listings and user search.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub follower_count: usize,
}

impl UserSummary {
    pub fn build(profile: &UserProfile) -> Self {
        UserSummary {
            id: profile.id,
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            bio: profile.bio.clone(),
            follower_count: profile.follower_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub follower_count: usize,
    pub following_count: usize,
    /// Present only when the caller is identified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Public profile with derived follower/following counts.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    responses(
        (status = 200, description = "The profile", body = UserProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
    caller: MaybeUser,
) -> Result<HttpResponse> {
    let profile = store.user(*user_id)?;

    let is_following = caller
        .0
        .filter(|id| *id != profile.id)
        .map(|id| profile.followers.contains(id));

    let user = UserProfileResponse {
        id: profile.id,
        name: profile.name.clone(),
        avatar: profile.avatar.clone(),
        bio: profile.bio.clone(),
        follower_count: profile.follower_count(),
        following_count: profile.following_count(),
        is_following,
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": { "user": user }
    })))
}

/// Published posts by this author, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/posts",
    tag = "users",
    params(UserPostsQuery),
    responses((status = 200, description = "Page of the author's posts"))
)]
pub async fn get_user_posts(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
    query: web::Query<UserPostsQuery>,
    caller: MaybeUser,
) -> Result<HttpResponse> {
    metrics::RETRIEVAL_REQUESTS
        .with_label_values(&["user_posts"])
        .inc();

    // Resolve the author first so an unknown user is a 404, not an empty page.
    store.user(*user_id)?;

    let filter = PostFilter {
        tag: None,
        author: Some(*user_id),
    };
    let service = PostService::new(store.get_ref().clone());
    let (window, meta) = service.list_posts(
        &filter,
        SortMode::Newest,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": {
            "posts": PostResponse::build_many(store.get_ref(), &window, caller.0),
            "pagination": meta,
        }
    })))
}

/// Toggle the caller following this user; both sides of the pair move
/// together.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/follow",
    tag = "users",
    responses(
        (status = 200, description = "Toggle applied"),
        (status = 400, description = "Self-follow rejected"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Concurrent toggle retries exhausted")
    )
)]
pub async fn toggle_follow(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
    caller: UserId,
) -> Result<HttpResponse> {
    metrics::ENGAGEMENT_TOGGLES
        .with_label_values(&["follow"])
        .inc();

    let service = FollowService::new(store.get_ref().clone());
    let change = service.toggle_follow(caller.0, *user_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": if change.is_following { "User followed" } else { "User unfollowed" },
        "data": {
            "isFollowing": change.is_following,
            "followerCount": change.follower_count,
            "followingCount": change.following_count,
        }
    })))
}

/// Profiles following this user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/followers",
    tag = "users",
    responses(
        (status = 200, description = "Follower profiles"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_followers(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let profile = store.user(*user_id)?;
    let followers = member_summaries(store.get_ref(), profile.followers.members());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": { "followers": followers }
    })))
}

/// Profiles this user follows.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/following",
    tag = "users",
    responses(
        (status = 200, description = "Followed profiles"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_following(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let profile = store.user(*user_id)?;
    let following = member_summaries(store.get_ref(), profile.following.members());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": { "following": following }
    })))
}

/// Posts the user has liked. Own profile only.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/liked-posts",
    tag = "users",
    params(UserPostsQuery),
    responses(
        (status = 200, description = "Page of liked posts"),
        (status = 403, description = "Not the profile owner")
    )
)]
pub async fn liked_posts(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
    query: web::Query<UserPostsQuery>,
    caller: UserId,
) -> Result<HttpResponse> {
    ensure_profile_access(*user_id, caller.0)?;

    let service = PostService::new(store.get_ref().clone());
    let (window, meta) = service.liked_posts(
        *user_id,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": {
            "posts": PostResponse::build_many(store.get_ref(), &window, Some(caller.0)),
            "pagination": meta,
        }
    })))
}

/// Posts the user has bookmarked. Own profile only.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/bookmarked-posts",
    tag = "users",
    params(UserPostsQuery),
    responses(
        (status = 200, description = "Page of bookmarked posts"),
        (status = 403, description = "Not the profile owner")
    )
)]
pub async fn bookmarked_posts(
    store: web::Data<Arc<Store>>,
    user_id: web::Path<Uuid>,
    query: web::Query<UserPostsQuery>,
    caller: UserId,
) -> Result<HttpResponse> {
    ensure_profile_access(*user_id, caller.0)?;

    let service = PostService::new(store.get_ref().clone());
    let (window, meta) = service.bookmarked_posts(
        *user_id,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": {
            "posts": PostResponse::build_many(store.get_ref(), &window, Some(caller.0)),
            "pagination": meta,
        }
    })))
}

/// Profile-access primitive: engagement listings are visible to their owner
/// only.
fn ensure_profile_access(profile_id: Uuid, caller_id: Uuid) -> Result<()> {
    if profile_id == caller_id {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "You can only access your own profile data".to_string(),
        ))
    }
}

fn member_summaries(store: &Store, member_ids: Vec<Uuid>) -> Vec<UserSummary> {
    let mut summaries: Vec<UserSummary> = member_ids
        .into_iter()
        .filter_map(|id| store.user_opt(id))
        .map(|profile| UserSummary::build(&profile))
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}
