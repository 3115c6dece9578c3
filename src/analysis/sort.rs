//! Keyword Sorting
//!
//! Sortable columns of an analysis table, each with its own typed comparator.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::analysis::model::AggregatedKeyword;

// == Sort Column ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Keyword,
    SearchVolume,
    Difficulty,
    Cpc,
    SourceCount,
    OpportunityScore,
    SubjectPosition,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl SortColumn {
    /// Compares two keywords on this column. Missing values sort last in
    /// either order.
    pub fn compare(self, a: &AggregatedKeyword, b: &AggregatedKeyword, order: SortOrder) -> Ordering {
        match self {
            SortColumn::Keyword => order.apply(compare_text(&a.keyword, &b.keyword)),
            SortColumn::SearchVolume => order.apply(a.search_volume.cmp(&b.search_volume)),
            SortColumn::Difficulty => order.apply(a.difficulty.cmp(&b.difficulty)),
            SortColumn::SourceCount => order.apply(a.source_count.cmp(&b.source_count)),
            SortColumn::Cpc => compare_optional(a.cpc, b.cpc, order, f64::total_cmp),
            SortColumn::OpportunityScore => {
                compare_optional(a.opportunity_score, b.opportunity_score, order, Ord::cmp)
            }
            SortColumn::SubjectPosition => compare_optional(
                a.subject_ranking.map(|r| r.position),
                b.subject_ranking.map(|r| r.position),
                order,
                Ord::cmp,
            ),
        }
    }
}

/// Case-folded comparison, falling back to the raw strings for a total order.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_optional<T>(
    a: Option<T>,
    b: Option<T>,
    order: SortOrder,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => order.apply(cmp(&x, &y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// == Sort Keywords ==
/// Stable sort of `keywords` by `column`.
pub fn sort_keywords(keywords: &mut [AggregatedKeyword], column: SortColumn, order: SortOrder) {
    keywords.sort_by(|a, b| column.compare(a, b, order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::RankedKeyword;

    fn opportunity(keyword: &str, volume: u64, cpc: Option<f64>, score: u8) -> AggregatedKeyword {
        let mut ranked = RankedKeyword::new(keyword, volume, 10, 1);
        ranked.record.cpc = cpc;
        let mut kw = AggregatedKeyword::from_source("rival.com", &ranked);
        kw.opportunity_score = Some(score);
        kw
    }

    fn subject(keyword: &str, position: u32) -> AggregatedKeyword {
        AggregatedKeyword::from_subject(&RankedKeyword::new(keyword, 1, 1, position))
    }

    fn names(keywords: &[AggregatedKeyword]) -> Vec<&str> {
        keywords.iter().map(|k| k.keyword.as_str()).collect()
    }

    #[test]
    fn test_sort_by_volume() {
        let mut kws = vec![
            opportunity("b", 200, None, 1),
            opportunity("a", 900, None, 1),
            opportunity("c", 50, None, 1),
        ];

        sort_keywords(&mut kws, SortColumn::SearchVolume, SortOrder::Desc);
        assert_eq!(names(&kws), vec!["a", "b", "c"]);

        sort_keywords(&mut kws, SortColumn::SearchVolume, SortOrder::Asc);
        assert_eq!(names(&kws), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_by_keyword_is_case_insensitive() {
        let mut kws = vec![
            opportunity("beta", 1, None, 1),
            opportunity("Alpha", 1, None, 1),
            opportunity("alpha", 1, None, 1),
            opportunity("Gamma", 1, None, 1),
        ];

        sort_keywords(&mut kws, SortColumn::Keyword, SortOrder::Asc);
        assert_eq!(names(&kws), vec!["Alpha", "alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_missing_values_sort_last_both_ways() {
        let mut kws = vec![
            opportunity("none", 1, None, 1),
            opportunity("cheap", 1, Some(0.5), 1),
            opportunity("pricey", 1, Some(7.25), 1),
        ];

        sort_keywords(&mut kws, SortColumn::Cpc, SortOrder::Desc);
        assert_eq!(names(&kws), vec!["pricey", "cheap", "none"]);

        sort_keywords(&mut kws, SortColumn::Cpc, SortOrder::Asc);
        assert_eq!(names(&kws), vec!["cheap", "pricey", "none"]);
    }

    #[test]
    fn test_sort_by_score_and_position() {
        let mut kws = vec![
            subject("mine", 3),
            opportunity("low", 1, None, 10),
            opportunity("high", 1, None, 80),
            subject("top", 1),
        ];

        sort_keywords(&mut kws, SortColumn::OpportunityScore, SortOrder::Desc);
        assert_eq!(names(&kws), vec!["high", "low", "mine", "top"]);

        sort_keywords(&mut kws, SortColumn::SubjectPosition, SortOrder::Asc);
        assert_eq!(names(&kws)[..2], ["top", "mine"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut kws = vec![
            opportunity("first", 5, None, 1),
            opportunity("second", 5, None, 1),
            opportunity("third", 5, None, 1),
        ];

        sort_keywords(&mut kws, SortColumn::SearchVolume, SortOrder::Desc);
        assert_eq!(names(&kws), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_column_names() {
        let column: SortColumn = serde_json::from_str("\"opportunity_score\"").unwrap();
        assert_eq!(column, SortColumn::OpportunityScore);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
