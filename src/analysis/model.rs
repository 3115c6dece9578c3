//! Analysis Data Model
//!
//! Keyword records as produced by sources, and the merged, classified view
//! built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

// == Keyword Record ==
/// Keyword metrics reported by a source. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    pub keyword: String,
    /// Monthly searches
    pub search_volume: u64,
    /// Ranking difficulty, 0-100
    pub difficulty: u8,
    /// Cost per click, when the source knows it
    #[serde(default)]
    pub cpc: Option<f64>,
}

// == Ranked Keyword ==
/// A keyword record together with the position the fetched domain holds for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedKeyword {
    #[serde(flatten)]
    pub record: KeywordRecord,
    /// Search result position, 1 = best
    pub position: u32,
    /// Estimated traffic value
    #[serde(default)]
    pub etv: Option<f64>,
}

impl RankedKeyword {
    pub fn new(keyword: impl Into<String>, search_volume: u64, difficulty: u8, position: u32) -> Self {
        Self {
            record: KeywordRecord {
                keyword: keyword.into(),
                search_volume,
                difficulty,
                cpc: None,
            },
            position,
            etv: None,
        }
    }
}

/// Case-insensitive merge key of a keyword.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

// == Rankings ==
/// The subject domain's own ranking for a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectRanking {
    pub position: u32,
    #[serde(default)]
    pub etv: Option<f64>,
}

/// One source's ranking for a keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRanking {
    pub source_id: String,
    pub position: u32,
    #[serde(default)]
    pub estimated_traffic_value: Option<f64>,
}

// == Keyword Class ==
/// Partition a merged keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordClass {
    /// Ranked by at least one source, not by the subject
    Opportunity,
    /// Ranked by the subject and at least one source
    Shared,
    /// Ranked by the subject only
    UniqueToSubject,
}

// == Aggregated Keyword ==
/// A keyword merged across the subject and every source that ranks for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedKeyword {
    pub keyword: String,
    pub search_volume: u64,
    pub difficulty: u8,
    pub cpc: Option<f64>,
    pub subject_ranking: Option<SubjectRanking>,
    pub source_rankings: Vec<SourceRanking>,
    /// Always `source_rankings.len()`
    pub source_count: usize,
    /// Subject absent and at least one source present
    pub is_opportunity: bool,
    /// 0-100, present exactly when `is_opportunity`
    pub opportunity_score: Option<u8>,
}

impl AggregatedKeyword {
    /// Seeds an entry from the subject's own keyword list.
    pub fn from_subject(ranked: &RankedKeyword) -> Self {
        Self {
            subject_ranking: Some(SubjectRanking {
                position: ranked.position,
                etv: ranked.etv,
            }),
            ..Self::bare(&ranked.record)
        }
    }

    /// Creates an entry first seen in `source_id`'s keyword list.
    pub fn from_source(source_id: &str, ranked: &RankedKeyword) -> Self {
        let mut keyword = Self::bare(&ranked.record);
        keyword.add_source_ranking(source_id, ranked);
        keyword
    }

    fn bare(record: &KeywordRecord) -> Self {
        Self {
            keyword: record.keyword.clone(),
            search_volume: record.search_volume,
            difficulty: record.difficulty,
            cpc: record.cpc,
            subject_ranking: None,
            source_rankings: Vec::new(),
            source_count: 0,
            is_opportunity: false,
            opportunity_score: None,
        }
    }

    /// Records that `source_id` ranks for this keyword.
    ///
    /// Returns false, leaving the entry unchanged, when that source already
    /// has a ranking here.
    pub fn add_source_ranking(&mut self, source_id: &str, ranked: &RankedKeyword) -> bool {
        if self.source_rankings.iter().any(|r| r.source_id == source_id) {
            return false;
        }
        self.source_rankings.push(SourceRanking {
            source_id: source_id.to_string(),
            position: ranked.position,
            estimated_traffic_value: ranked.etv,
        });
        self.source_count = self.source_rankings.len();
        self.is_opportunity = self.subject_ranking.is_none() && self.source_count > 0;
        true
    }

    /// Partition this keyword falls into.
    pub fn class(&self) -> KeywordClass {
        match (self.subject_ranking.is_some(), self.source_count > 0) {
            (false, _) => KeywordClass::Opportunity,
            (true, true) => KeywordClass::Shared,
            (true, false) => KeywordClass::UniqueToSubject,
        }
    }
}

// == Analysis Result ==
/// Classified, scored outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub subject_domain: String,
    /// Every merged keyword, in first-seen order
    pub all_keywords: Vec<AggregatedKeyword>,
    /// Opportunities by descending score
    pub opportunities: Vec<AggregatedKeyword>,
    pub shared: Vec<AggregatedKeyword>,
    pub unique_to_subject: Vec<AggregatedKeyword>,
    pub total_keywords: usize,
    /// Source ids in the order they were supplied
    pub analyzed_sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Sources whose fetch failed and contributed nothing
    #[serde(default)]
    pub failed_sources: Vec<String>,
    /// Records rejected while parsing source payloads
    #[serde(default)]
    pub diagnostics: Vec<ParseError>,
}
