/// Search handlers - free-text search, popular tags, and typeahead
use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::MaybeUser;
use crate::services::{
    pagination, ranking, search, tags, PostFilter, PostService, SortMode, DEFAULT_PAGE_SIZE,
};
use crate::store::Store;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::posts::PostResponse;
use super::users::UserSummary;

const DEFAULT_TAG_LIMIT: usize = 20;

/// Which entity kinds a search request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchScope {
    Posts,
    Users,
    All,
}

impl SearchScope {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("all") => Ok(SearchScope::All),
            Some("posts") => Ok(SearchScope::Posts),
            Some("users") => Ok(SearchScope::Users),
            Some(_) => Err(AppError::validation(
                "type",
                "Type must be posts, users, or all",
            )),
        }
    }

    fn covers_posts(self) -> bool {
        matches!(self, SearchScope::Posts | SearchScope::All)
    }

    fn covers_users(self) -> bool {
        matches!(self, SearchScope::Users | SearchScope::All)
    }
}

/// Post ordering for search results; `relevance` only applies when a query
/// is present and falls back to `newest` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchSort {
    Relevance,
    Mode(SortMode),
}

impl SearchSort {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("relevance") => Ok(SearchSort::Relevance),
            Some("newest") => Ok(SearchSort::Mode(SortMode::Newest)),
            Some("oldest") => Ok(SearchSort::Mode(SortMode::Oldest)),
            Some("popular") => Ok(SearchSort::Mode(SortMode::Popular)),
            Some(_) => Err(AppError::validation("sort", "Invalid sort option")),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub scope: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub tag: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TagsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SuggestionsQuery {
    pub q: Option<String>,
}

/// Search posts and users.
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matched posts and users with combined pagination"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn search(
    store: web::Data<Arc<Store>>,
    query: web::Query<SearchQuery>,
    caller: MaybeUser,
) -> Result<HttpResponse> {
    metrics::RETRIEVAL_REQUESTS
        .with_label_values(&["search"])
        .inc();
    let started = std::time::Instant::now();

    let scope = SearchScope::parse(query.scope.as_deref())?;
    let sort = SearchSort::parse(query.sort.as_deref())?;
    let needle = query.q.as_deref().map(str::trim).unwrap_or("");
    if query.q.is_some() && needle.is_empty() {
        return Err(AppError::validation("q", "Search query must not be empty"));
    }

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let mut total_results: i64 = 0;
    let mut posts = Vec::new();
    let mut users = Vec::new();

    if scope.covers_posts() {
        let service = PostService::new(store.get_ref().clone());
        let filter = PostFilter {
            tag: query.tag.clone(),
            author: None,
        };
        let candidates = service.filtered_published(&filter);

        let ordered = match (needle.is_empty(), sort) {
            // SearchIndex is bypassed for an empty query; newest is the
            // default ordering.
            (true, SearchSort::Relevance) => {
                let mut items = candidates;
                ranking::order(&mut items, SortMode::Newest);
                items
            }
            (true, SearchSort::Mode(mode)) => {
                let mut items = candidates;
                ranking::order(&mut items, mode);
                items
            }
            (false, SearchSort::Relevance) => search::rank_by_relevance(candidates, needle),
            (false, SearchSort::Mode(mode)) => {
                let mut items = search::rank_by_relevance(candidates, needle);
                ranking::order(&mut items, mode);
                items
            }
        };

        total_results += ordered.len() as i64;
        let (window, _) = pagination::paginate(&ordered, page, limit)?;
        posts = PostResponse::build_many(store.get_ref(), &window, caller.0);
    }

    if scope.covers_users() {
        let matched = search::rank_users(store.user_profiles(), needle);
        total_results += matched.len() as i64;
        let (window, _) = pagination::paginate(&matched, page, limit)?;
        users = window
            .iter()
            .map(|profile| UserSummary::build(profile))
            .collect();
    }

    // One pagination block over the combined result count, the way the feed
    // API has always reported it.
    let meta = pagination::meta(total_results, page, limit)?;

    let body = serde_json::json!({
        "status": "success",
        "data": {
            "posts": posts,
            "users": users,
            "pagination": meta,
        }
    });
    metrics::RETRIEVAL_DURATION_SECONDS
        .with_label_values(&["search"])
        .observe(started.elapsed().as_secs_f64());
    Ok(HttpResponse::Ok().json(body))
}

/// Most used tags across published posts.
#[utoipa::path(
    get,
    path = "/api/v1/search/tags",
    tag = "search",
    params(TagsQuery),
    responses((status = 200, description = "Top tags with usage counts"))
)]
pub async fn popular_tags(
    store: web::Data<Arc<Store>>,
    query: web::Query<TagsQuery>,
) -> Result<HttpResponse> {
    let corpus = store.published_snapshots();
    let top = tags::top_tags(&corpus, query.limit.unwrap_or(DEFAULT_TAG_LIMIT));

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": { "tags": top }
    })))
}

/// Typeahead suggestions over post titles, tags, and user names.
#[utoipa::path(
    get,
    path = "/api/v1/search/suggestions",
    tag = "search",
    params(SuggestionsQuery),
    responses((status = 200, description = "Up to ten suggestions"))
)]
pub async fn suggestions(
    store: web::Data<Arc<Store>>,
    query: web::Query<SuggestionsQuery>,
) -> Result<HttpResponse> {
    let needle = query.q.as_deref().unwrap_or("");
    let corpus = store.published_snapshots();
    let profiles = store.user_profiles();
    let found = search::suggestions(&corpus, &profiles, needle);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "data": { "suggestions": found }
    })))
}
