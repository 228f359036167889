/// SearchIndex - field-weighted term-frequency relevance
///
/// Posts are scored per query token across four weighted fields; the score
/// is weight × occurrence count, summed. This reproduces a weighted text
/// index, not TF-IDF or BM25. User profiles use a simpler contains-match and
/// rank by follower count, since they are not part of the weighted index.
use crate::models::{PostSnapshot, UserProfile};
use std::cmp::Ordering;
use std::sync::Arc;

const TITLE_WEIGHT: f64 = 10.0;
const TAG_WEIGHT: f64 = 5.0;
const EXCERPT_WEIGHT: f64 = 3.0;
const BODY_WEIGHT: f64 = 1.0;

/// Relevance of `item` for `query`. Zero when nothing matches.
pub fn score(query: &str, item: &PostSnapshot) -> f64 {
    let title = item.title.to_lowercase();
    let excerpt = item.excerpt.to_lowercase();
    let body = item.body.to_lowercase();
    let tags: Vec<String> = item.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut total = 0.0;
    for token in query.split_whitespace() {
        let token = token.to_lowercase();
        total += TITLE_WEIGHT * occurrences(&title, &token) as f64;
        total += EXCERPT_WEIGHT * occurrences(&excerpt, &token) as f64;
        total += BODY_WEIGHT * occurrences(&body, &token) as f64;

        let tag_hits: usize = tags.iter().map(|tag| occurrences(tag, &token)).sum();
        total += TAG_WEIGHT * tag_hits as f64;
    }
    total
}

/// Score and order `items` for a non-empty query: zero-score items are
/// excluded, ties break by recency so the order is deterministic.
pub fn rank_by_relevance(items: Vec<PostSnapshot>, query: &str) -> Vec<PostSnapshot> {
    let mut scored: Vec<(PostSnapshot, f64)> = items
        .into_iter()
        .filter_map(|item| {
            let s = score(query, &item);
            (s > 0.0).then_some((item, s))
        })
        .collect();

    scored.sort_by(|a, b| match b.1.partial_cmp(&a.1) {
        Some(Ordering::Equal) | None => b.0.created_at.cmp(&a.0.created_at),
        Some(ord) => ord,
    });

    scored.into_iter().map(|(item, _)| item).collect()
}

/// Fuzzy contains-match over name and bio for ancillary user search.
pub fn matches_user(query: &str, profile: &UserProfile) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    profile.name.to_lowercase().contains(&needle)
        || profile.bio.to_lowercase().contains(&needle)
}

/// Users matching `query`, ranked by follower count descending.
pub fn rank_users(profiles: Vec<Arc<UserProfile>>, query: &str) -> Vec<Arc<UserProfile>> {
    let mut matched: Vec<Arc<UserProfile>> = profiles
        .into_iter()
        .filter(|profile| matches_user(query, profile))
        .collect();
    matched.sort_by(|a, b| {
        b.follower_count()
            .cmp(&a.follower_count())
            .then_with(|| a.name.cmp(&b.name))
    });
    matched
}

/// Typeahead suggestion sourced from post titles, tags, or user names.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl Suggestion {
    fn new(kind: &str, text: impl Into<String>) -> Self {
        Suggestion {
            kind: kind.to_string(),
            text: text.into(),
        }
    }
}

const TITLE_SUGGESTION_LIMIT: usize = 5;
const TAG_SUGGESTION_LIMIT: usize = 5;
const USER_SUGGESTION_LIMIT: usize = 3;
const SUGGESTION_LIMIT: usize = 10;

/// Typeahead suggestions for queries of at least two characters: up to five
/// post titles, five tags, and three user names, capped at ten overall.
pub fn suggestions(
    items: &[PostSnapshot],
    profiles: &[Arc<UserProfile>],
    query: &str,
) -> Vec<Suggestion> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < 2 {
        return Vec::new();
    }

    let mut out: Vec<Suggestion> = items
        .iter()
        .filter(|item| item.published && item.title.to_lowercase().contains(&needle))
        .take(TITLE_SUGGESTION_LIMIT)
        .map(|item| Suggestion::new("post", item.title.clone()))
        .collect();

    let mut tags: Vec<&String> = items
        .iter()
        .filter(|item| item.published)
        .flat_map(|item| item.tags.iter())
        .filter(|tag| tag.contains(&needle))
        .collect();
    tags.sort();
    tags.dedup();
    out.extend(
        tags.into_iter()
            .take(TAG_SUGGESTION_LIMIT)
            .map(|tag| Suggestion::new("tag", tag.clone())),
    );

    out.extend(
        profiles
            .iter()
            .filter(|profile| profile.name.to_lowercase().contains(&needle))
            .take(USER_SUGGESTION_LIMIT)
            .map(|profile| Suggestion::new("user", profile.name.clone())),
    );

    out.truncate(SUGGESTION_LIMIT);
    out
}

/// Non-overlapping occurrences of `needle` in `haystack`. Both sides must
/// already be lowercased.
fn occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        count += 1;
        start += pos + needle.len();
    }
    count
}
