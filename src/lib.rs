//! Keyword Gap - multi-source keyword gap analysis
//!
//! Merges keyword rankings from several sources, classifies and scores the
//! gaps, and caches analyses in a quota-bounded TTL store.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use analysis::{AnalysisResult, KeywordAggregator};
pub use api::AppState;
pub use cache::PersistentCache;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
