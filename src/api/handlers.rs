//! API Handlers
//!
//! HTTP request handlers for the analysis and cache administration endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::analysis::{
    parse_records, sort_keywords, AnalysisResult, DirectorySource, KeywordAggregator,
    KeywordSource, SourceHandle, SUBJECT_SOURCE_ID,
};
use crate::cache::{CacheConfig, CacheMetadata, FileStorage, MemoryStorage, PersistentCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    AnalyzeRequest, CacheStatsResponse, ClearResponse, DeleteResponse, HealthResponse,
    UpdateConfigRequest,
};

/// Application state shared across all handlers.
///
/// The cache sits behind Arc<RwLock<>> and is shared with the aggregator.
#[derive(Clone)]
pub struct AppState {
    /// Shared persistent cache
    pub cache: Arc<RwLock<PersistentCache>>,
    /// Analysis engine reading and writing through `cache`
    pub aggregator: KeywordAggregator,
}

impl AppState {
    /// Creates a new AppState around `cache` and `source`.
    pub fn new(
        cache: PersistentCache,
        source: Arc<dyn KeywordSource>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        let aggregator =
            KeywordAggregator::new(cache.clone(), source).with_fetch_timeout(fetch_timeout);
        Self { cache, aggregator }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses a file-backed store when `cache_dir` is set, in-memory otherwise,
    /// and reads sources from `sources_dir`.
    pub fn from_config(config: &Config) -> Self {
        let fallback = CacheConfig {
            expiration_days: config.cache_expiration_days,
        };
        let cache = match &config.cache_dir {
            Some(dir) => PersistentCache::with_fallback_config(
                FileStorage::new(dir.clone(), Some(config.cache_quota_bytes)),
                fallback,
            ),
            None => PersistentCache::with_fallback_config(
                MemoryStorage::with_quota(config.cache_quota_bytes),
                fallback,
            ),
        };
        let source = Arc::new(DirectorySource::new(config.sources_dir.clone()));
        let fetch_timeout =
            (config.fetch_timeout_secs > 0).then(|| Duration::from_secs(config.fetch_timeout_secs));
        Self::new(cache, source, fetch_timeout)
    }
}

/// Handler for POST /analyze
///
/// Runs (or recalls) a keyword gap analysis. Malformed subject records are
/// reported in `diagnostics` instead of failing the request.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let subject = parse_records(SUBJECT_SOURCE_ID, &req.subject_keywords);
    let sources: Vec<SourceHandle> = req
        .sources
        .iter()
        .map(|id| SourceHandle::new(id.trim()))
        .collect();

    let mut result = state
        .aggregator
        .analyze(req.subject_domain.trim(), &subject.keywords, &sources)
        .await;

    // Response-only adjustments; the cached value is left as stored
    let mut diagnostics = subject.diagnostics;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;
    if let Some(column) = req.sort {
        sort_keywords(&mut result.all_keywords, column, req.order);
        sort_keywords(&mut result.opportunities, column, req.order);
        sort_keywords(&mut result.shared, column, req.order);
        sort_keywords(&mut result.unique_to_subject, column, req.order);
    }

    Ok(Json(result))
}

/// Handler for GET /cache/config
pub async fn get_config_handler(State(state): State<AppState>) -> Json<CacheConfig> {
    Json(state.cache.read().await.config())
}

/// Handler for PUT /cache/config
pub async fn set_config_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateConfigRequest>,
) -> Result<Json<CacheConfig>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let config = CacheConfig {
        expiration_days: req.expiration_days,
    };
    state.cache.write().await.set_config(config);
    Ok(Json(config))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    // Acquire read lock for stats
    let cache = state.cache.read().await;

    Json(CacheStatsResponse::new(
        &cache.stats(),
        cache.len(),
        cache.size_bytes(),
        cache.config().expiration_days,
    ))
}

/// Handler for GET /cache/entries/:key
pub async fn metadata_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CacheMetadata>> {
    let cache = state.cache.read().await;
    cache
        .metadata(&key)
        .map(Json)
        .ok_or(ApiError::NotFound(key))
}

/// Handler for DELETE /cache/entries/:key
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.write().await.remove(&key);
    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.write().await.clear_all();
    info!("Cache cleared via API");
    Json(ClearResponse::new(removed))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SortColumn;
    use crate::cache::derive_key;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("rival.com.json"),
            r#"[
                {"keyword": "keyword research", "searchVolume": 3000, "difficulty": 30, "position": 3},
                {"keyword": "rank tracker", "searchVolume": 90000, "difficulty": 10, "position": 1}
            ]"#,
        )
        .unwrap();
        let state = AppState::new(
            PersistentCache::new(MemoryStorage::new()),
            Arc::new(DirectorySource::new(temp_dir.path())),
            None,
        );
        (state, temp_dir)
    }

    fn analyze_request(sort: Option<SortColumn>) -> AnalyzeRequest {
        AnalyzeRequest {
            subject_domain: "example.com".to_string(),
            subject_keywords: vec![
                json!({"keyword": "seo tools", "searchVolume": 5000, "difficulty": 40, "position": 5}),
                json!({"keyword": "broken"}),
            ],
            sources: vec!["rival.com".to_string()],
            sort,
            order: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_analyze_handler() {
        let (state, _temp_dir) = create_test_state();

        let Json(result) = analyze_handler(State(state.clone()), Json(analyze_request(None)))
            .await
            .unwrap();

        assert_eq!(result.total_keywords, 3);
        assert_eq!(result.opportunities[0].keyword, "rank tracker");
        assert_eq!(result.unique_to_subject[0].keyword, "seo tools");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].source_id, SUBJECT_SOURCE_ID);

        // The stored analysis does not carry request-specific diagnostics
        let key = derive_key("example.com", ["rival.com"]);
        let cached: AnalysisResult = state.cache.write().await.get(&key).unwrap();
        assert!(cached.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_handler_sorts_response() {
        let (state, _temp_dir) = create_test_state();

        let Json(result) = analyze_handler(
            State(state),
            Json(analyze_request(Some(SortColumn::SearchVolume))),
        )
        .await
        .unwrap();

        let volumes: Vec<u64> = result.all_keywords.iter().map(|k| k.search_volume).collect();
        assert_eq!(volumes, vec![90000, 5000, 3000]);
    }

    #[tokio::test]
    async fn test_analyze_invalid_domain() {
        let (state, _temp_dir) = create_test_state();
        let mut req = analyze_request(None);
        req.subject_domain = "".to_string();

        let result = analyze_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_config_handlers() {
        let (state, _temp_dir) = create_test_state();

        let Json(config) = get_config_handler(State(state.clone())).await;
        assert_eq!(config, CacheConfig::default());

        let result = set_config_handler(
            State(state.clone()),
            Json(UpdateConfigRequest { expiration_days: 30 }),
        )
        .await;
        assert!(result.is_ok());

        let Json(config) = get_config_handler(State(state.clone())).await;
        assert_eq!(config.expiration_days, 30);

        let result = set_config_handler(
            State(state),
            Json(UpdateConfigRequest { expiration_days: 1000 }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_metadata_delete_and_clear() {
        let (state, _temp_dir) = create_test_state();
        analyze_handler(State(state.clone()), Json(analyze_request(None)))
            .await
            .unwrap();
        let key = derive_key("example.com", ["rival.com"]);

        let meta = metadata_handler(State(state.clone()), Path(key.clone())).await;
        assert_eq!(meta.unwrap().age_in_days, 0);

        delete_entry_handler(State(state.clone()), Path(key.clone())).await;
        let meta = metadata_handler(State(state.clone()), Path(key)).await;
        assert!(matches!(meta, Err(ApiError::NotFound(_))));

        analyze_handler(State(state.clone()), Json(analyze_request(None)))
            .await
            .unwrap();
        let Json(cleared) = clear_handler(State(state.clone())).await;
        assert_eq!(cleared.removed, 1);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, _temp_dir) = create_test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.entries, 0);
        assert_eq!(response.size_bytes, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
