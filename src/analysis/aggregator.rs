//! Keyword Aggregator
//!
//! Runs an analysis: cache lookup, concurrent fan-out to every source, merge,
//! and write-back. A failed or late source contributes nothing; the analysis
//! itself always completes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::RwLock;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::analysis::merge::{build_analysis, SourceContribution};
use crate::analysis::model::{AnalysisResult, RankedKeyword};
use crate::analysis::source::{KeywordSource, ParsedKeywords, SourceHandle};
use crate::cache::{derive_key, PersistentCache};
use crate::error::SourceError;

// == Keyword Aggregator ==
/// Produces cached, classified keyword gap analyses.
#[derive(Clone)]
pub struct KeywordAggregator {
    /// Shared cache, also used by the admin endpoints
    cache: Arc<RwLock<PersistentCache>>,
    source: Arc<dyn KeywordSource>,
    /// Deadline applied by [`KeywordAggregator::analyze`], None = wait forever
    fetch_timeout: Option<Duration>,
}

impl KeywordAggregator {
    pub fn new(cache: Arc<RwLock<PersistentCache>>, source: Arc<dyn KeywordSource>) -> Self {
        Self {
            cache,
            source,
            fetch_timeout: None,
        }
    }

    /// Sets the default fetch deadline, measured from the start of each analysis.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<RwLock<PersistentCache>> {
        &self.cache
    }

    // == Analyze ==
    /// Analyzes `subject_domain` against `sources` using the default deadline.
    pub async fn analyze(
        &self,
        subject_domain: &str,
        subject_keywords: &[RankedKeyword],
        sources: &[SourceHandle],
    ) -> AnalysisResult {
        let deadline = self.fetch_timeout.map(|t| Instant::now() + t);
        self.analyze_until(subject_domain, subject_keywords, sources, deadline)
            .await
    }

    /// Analyzes with an explicit fetch deadline.
    ///
    /// A cached result for the same domain and source set is returned as is,
    /// without fetching. Otherwise every source is fetched concurrently and
    /// merged in the order supplied. Sources still pending at `deadline` are
    /// treated as failed. Dropping the returned future drops every in-flight
    /// fetch with it.
    pub async fn analyze_until(
        &self,
        subject_domain: &str,
        subject_keywords: &[RankedKeyword],
        sources: &[SourceHandle],
        deadline: Option<Instant>,
    ) -> AnalysisResult {
        let key = derive_key(subject_domain, sources.iter().map(|s| s.id.as_str()));

        if let Some(cached) = self.cache.write().await.get::<AnalysisResult>(&key) {
            info!("Cache hit for '{}'", key);
            return cached;
        }

        debug!("Cache miss for '{}', fetching {} sources", key, sources.len());
        let fetches = sources.iter().map(|s| self.fetch_source(&s.id, deadline));
        let contributions: Vec<SourceContribution> = join_all(fetches).await;

        let result = build_analysis(subject_domain, subject_keywords, &contributions, Utc::now());
        info!(
            "Analyzed '{}': {} keywords, {} opportunities, {} shared, {} unique, {} failed sources",
            subject_domain,
            result.total_keywords,
            result.opportunities.len(),
            result.shared.len(),
            result.unique_to_subject.len(),
            result.failed_sources.len()
        );

        self.cache.write().await.save(&key, &result, None);
        result
    }

    /// Fetches one source, degrading any failure to an empty contribution.
    async fn fetch_source(&self, source_id: &str, deadline: Option<Instant>) -> SourceContribution {
        let fetch = self.source.fetch(source_id);
        let outcome: Result<ParsedKeywords, SourceError> = match deadline {
            Some(deadline) => match timeout_at(deadline, fetch).await {
                Ok(outcome) => outcome,
                Err(_) => Err(SourceError::Timeout(source_id.to_string())),
            },
            None => fetch.await,
        };

        match outcome {
            Ok(parsed) => {
                SourceContribution::succeeded(source_id, parsed.keywords, parsed.diagnostics)
            }
            Err(e) => {
                warn!("Source '{}' failed, continuing without it: {}", source_id, e);
                SourceContribution::failed(source_id)
            }
        }
    }
}
