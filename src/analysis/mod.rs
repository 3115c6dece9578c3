//! Analysis Module
//!
//! Multi-source keyword aggregation: fetch, merge, classify and score.

mod aggregator;
mod merge;
mod model;
mod scoring;
mod sort;
mod source;


pub use aggregator::KeywordAggregator;
pub use merge::{build_analysis, SourceContribution};
pub use model::{
    normalize_keyword, AggregatedKeyword, AnalysisResult, KeywordClass, KeywordRecord,
    RankedKeyword, SourceRanking, SubjectRanking,
};
pub use scoring::opportunity_score;
pub use sort::{sort_keywords, SortColumn, SortOrder};
pub use source::{
    parse_record, parse_records, DirectorySource, KeywordSource, ParsedKeywords, SourceHandle,
    SUBJECT_SOURCE_ID,
};
