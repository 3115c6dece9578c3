//! Keyword Merge
//!
//! Folds the subject's keywords and every source contribution into one
//! classified, scored [`AnalysisResult`]. Pure and synchronous; the fetching
//! and caching around it live in the aggregator.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::analysis::model::{
    normalize_keyword, AggregatedKeyword, AnalysisResult, KeywordClass, RankedKeyword,
};
use crate::analysis::scoring::opportunity_score;
use crate::error::ParseError;

// == Source Contribution ==
/// What one source added to an analysis, after its fetch settled.
#[derive(Debug, Clone, Default)]
pub struct SourceContribution {
    pub source_id: String,
    /// Empty when the fetch failed
    pub keywords: Vec<RankedKeyword>,
    pub diagnostics: Vec<ParseError>,
    pub failed: bool,
}

impl SourceContribution {
    pub fn succeeded(
        source_id: impl Into<String>,
        keywords: Vec<RankedKeyword>,
        diagnostics: Vec<ParseError>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            keywords,
            diagnostics,
            failed: false,
        }
    }

    pub fn failed(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            failed: true,
            ..Self::default()
        }
    }
}

// == Keyword Map ==
/// Insertion-ordered map from normalized keyword to merged entry.
#[derive(Debug, Default)]
struct KeywordMap {
    index: HashMap<String, usize>,
    entries: Vec<AggregatedKeyword>,
}

impl KeywordMap {
    fn seed_subject(&mut self, ranked: &RankedKeyword) {
        let key = normalize_keyword(&ranked.record.keyword);
        if self.index.contains_key(&key) {
            debug!("Duplicate subject keyword '{}' ignored", ranked.record.keyword);
            return;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(AggregatedKeyword::from_subject(ranked));
    }

    fn add_source(&mut self, source_id: &str, ranked: &RankedKeyword) {
        let key = normalize_keyword(&ranked.record.keyword);
        match self.index.get(&key) {
            Some(&i) => {
                self.entries[i].add_source_ranking(source_id, ranked);
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries
                    .push(AggregatedKeyword::from_source(source_id, ranked));
            }
        }
    }
}

// == Build Analysis ==
/// Merges, classifies and scores keywords into a fresh result.
///
/// `contributions` must be in the order sources were supplied; that order
/// decides first-seen metrics, ranking order and score ties.
pub fn build_analysis(
    subject_domain: &str,
    subject_keywords: &[RankedKeyword],
    contributions: &[SourceContribution],
    timestamp: DateTime<Utc>,
) -> AnalysisResult {
    let mut map = KeywordMap::default();
    for ranked in subject_keywords {
        map.seed_subject(ranked);
    }
    for contribution in contributions {
        for ranked in &contribution.keywords {
            map.add_source(&contribution.source_id, ranked);
        }
    }

    let mut all_keywords = map.entries;
    for keyword in all_keywords.iter_mut().filter(|k| k.is_opportunity) {
        keyword.opportunity_score = Some(opportunity_score(
            keyword.search_volume,
            keyword.difficulty,
            keyword.source_count,
        ));
    }

    let of_class = |class: KeywordClass| -> Vec<AggregatedKeyword> {
        all_keywords
            .iter()
            .filter(|k| k.class() == class)
            .cloned()
            .collect()
    };
    let mut opportunities = of_class(KeywordClass::Opportunity);
    let shared = of_class(KeywordClass::Shared);
    let unique_to_subject = of_class(KeywordClass::UniqueToSubject);

    // Stable: equal scores keep first-seen order
    opportunities.sort_by_key(|k| Reverse(k.opportunity_score));

    AnalysisResult {
        subject_domain: subject_domain.to_string(),
        total_keywords: all_keywords.len(),
        all_keywords,
        opportunities,
        shared,
        unique_to_subject,
        analyzed_sources: contributions.iter().map(|c| c.source_id.clone()).collect(),
        timestamp,
        failed_sources: contributions
            .iter()
            .filter(|c| c.failed)
            .map(|c| c.source_id.clone())
            .collect(),
        diagnostics: contributions
            .iter()
            .flat_map(|c| c.diagnostics.iter().cloned())
            .collect(),
    }
}
