/// TagAggregator - top-N tag frequencies across published items
///
/// A deliberate full-corpus scan: each published item's tag set is exploded
/// into (item, tag) pairs, grouped, and counted. Callers cache the result
/// and refresh it periodically; the aggregation itself stays simple.
use crate::models::PostSnapshot;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Count tags across `items` (published only) and return the `n` most
/// frequent, ties broken lexicographically.
pub fn top_tags(items: &[PostSnapshot], n: usize) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items.iter().filter(|item| item.published) {
        // Tag sets are already deduplicated per item, so each item
        // contributes at most once per tag.
        for tag in &item.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags.truncate(n);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_POST_IMAGE;
    use chrono::Utc;
    use uuid::Uuid;

    fn snapshot(tags: &[&str], published: bool) -> PostSnapshot {
        PostSnapshot {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: "A reasonable title".to_string(),
            body: "a body easily long enough for the validation rules here".to_string(),
            excerpt: "an excerpt".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image: DEFAULT_POST_IMAGE.to_string(),
            published,
            views: 0,
            like_count: 0,
            bookmark_count: 0,
            comment_count: 0,
        }
    }

    #[test]
    fn counts_with_lexicographic_tie_break() {
        let corpus = vec![
            snapshot(&["a", "b"], true),
            snapshot(&["a"], true),
            snapshot(&["b"], true),
        ];

        let tags = top_tags(&corpus, 10);
        assert_eq!(
            tags,
            vec![
                TagCount { name: "a".to_string(), count: 2 },
                TagCount { name: "b".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn unpublished_items_do_not_count() {
        let corpus = vec![snapshot(&["a"], true), snapshot(&["a", "b"], false)];

        let tags = top_tags(&corpus, 10);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0], TagCount { name: "a".to_string(), count: 1 });
    }

    #[test]
    fn truncates_to_n() {
        let corpus = vec![snapshot(&["a", "b", "c", "d"], true)];
        assert_eq!(top_tags(&corpus, 2).len(), 2);
    }
}
