/// RankingEngine - total ordering of a filtered item set
///
/// Sort modes are a closed enum; the trending weights are system-wide policy
/// constants, deliberately not caller-tunable.
use crate::error::AppError;
use crate::models::PostSnapshot;
use serde::Deserialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Engagement weights for the trending score. Tunable constants preserved
/// from the upstream formula: likes*2 + bookmarks*1 + views*0.1.
const TRENDING_LIKE_WEIGHT: f64 = 2.0;
const TRENDING_BOOKMARK_WEIGHT: f64 = 1.0;
const TRENDING_VIEW_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Popular,
    Trending,
}

impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortMode::Newest),
            "oldest" => Ok(SortMode::Oldest),
            "popular" => Ok(SortMode::Popular),
            "trending" => Ok(SortMode::Trending),
            _ => Err(AppError::validation("sort", "Invalid sort option")),
        }
    }
}

/// Point-in-time engagement score. Not time-decayed; recency only shows up
/// through the lower accumulated counts of newer items.
pub fn trending_score(item: &PostSnapshot) -> f64 {
    item.like_count as f64 * TRENDING_LIKE_WEIGHT
        + item.bookmark_count as f64 * TRENDING_BOOKMARK_WEIGHT
        + item.views as f64 * TRENDING_VIEW_WEIGHT
}

/// Order `items` in place according to `mode`.
pub fn order(items: &mut [PostSnapshot], mode: SortMode) {
    match mode {
        SortMode::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Oldest => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortMode::Popular => items.sort_by(|a, b| {
            (b.views, b.like_count).cmp(&(a.views, a.like_count))
        }),
        SortMode::Trending => items.sort_by(|a, b| {
            match trending_score(b).partial_cmp(&trending_score(a)) {
                Some(Ordering::Equal) | None => b.created_at.cmp(&a.created_at),
                Some(ord) => ord,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_POST_IMAGE;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn snapshot(age_minutes: i64, views: u64, likes: usize, bookmarks: usize) -> PostSnapshot {
        let created = Utc::now() - Duration::minutes(age_minutes);
        PostSnapshot {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            created_at: created,
            updated_at: created,
            title: "A reasonable title".to_string(),
            body: "a body easily long enough to satisfy the validation rules".to_string(),
            excerpt: "an excerpt".to_string(),
            tags: vec!["rust".to_string()],
            image: DEFAULT_POST_IMAGE.to_string(),
            published: true,
            views,
            like_count: likes,
            bookmark_count: bookmarks,
            comment_count: 0,
        }
    }

    #[test]
    fn trending_score_uses_fixed_weights() {
        let item = snapshot(0, 100, 5, 2);
        assert!((trending_score(&item) - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn newest_and_oldest_are_mirrored() {
        let old = snapshot(120, 0, 0, 0);
        let new = snapshot(1, 0, 0, 0);

        let mut items = vec![old.clone(), new.clone()];
        order(&mut items, SortMode::Newest);
        assert_eq!(items[0].id, new.id);

        order(&mut items, SortMode::Oldest);
        assert_eq!(items[0].id, old.id);
    }

    #[test]
    fn popular_compares_views_then_likes() {
        let more_views = snapshot(0, 50, 1, 0);
        let fewer_views_more_likes = snapshot(0, 40, 9, 0);
        let tied_views_more_likes = snapshot(0, 50, 3, 0);

        let mut items = vec![
            fewer_views_more_likes.clone(),
            more_views.clone(),
            tied_views_more_likes.clone(),
        ];
        order(&mut items, SortMode::Popular);

        assert_eq!(items[0].id, tied_views_more_likes.id);
        assert_eq!(items[1].id, more_views.id);
        assert_eq!(items[2].id, fewer_views_more_likes.id);
    }

    #[test]
    fn trending_ties_break_by_recency() {
        let older = snapshot(60, 10, 1, 0);
        let newer = snapshot(5, 10, 1, 0);

        let mut items = vec![older.clone(), newer.clone()];
        order(&mut items, SortMode::Trending);
        assert_eq!(items[0].id, newer.id);
    }

    #[test]
    fn sort_mode_parses_known_values_only() {
        assert_eq!("trending".parse::<SortMode>().unwrap(), SortMode::Trending);
        assert!("hot".parse::<SortMode>().is_err());
    }
}
