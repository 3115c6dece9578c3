//! Request DTOs for the keyword gap API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::analysis::{SortColumn, SortOrder};

/// Longest expiration the config endpoint accepts, in days
pub const MAX_EXPIRATION_DAYS: u32 = 365;

/// Request body for POST /analyze
///
/// Subject keywords are taken raw and validated record by record, so one bad
/// record does not reject the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Domain whose keyword gaps are analyzed
    #[serde(alias = "subject_domain")]
    pub subject_domain: String,
    /// The subject's own ranked keywords
    #[serde(default, alias = "subject_keywords")]
    pub subject_keywords: Vec<Value>,
    /// Source ids to compare against
    #[serde(default)]
    pub sources: Vec<String>,
    /// Optional column to order the response by
    #[serde(default)]
    pub sort: Option<SortColumn>,
    #[serde(default)]
    pub order: SortOrder,
}

impl AnalyzeRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let domain = self.subject_domain.trim();
        if domain.is_empty() {
            return Some("Subject domain cannot be empty".to_string());
        }
        if !is_domain_like(domain) {
            return Some(format!("'{}' is not a valid domain", domain));
        }
        if let Some(bad) = self.sources.iter().find(|s| s.trim().is_empty()) {
            return Some(format!("Invalid source id '{}'", bad));
        }
        None
    }
}

fn is_domain_like(domain: &str) -> bool {
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-'))
}

/// Request body for PUT /cache/config
///
/// Same shape as the GET /cache/config response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    /// New time-to-live in days, 0 disables caching
    #[serde(alias = "expiration_days")]
    pub expiration_days: u32,
}

impl UpdateConfigRequest {
    pub fn validate(&self) -> Option<String> {
        if self.expiration_days > MAX_EXPIRATION_DAYS {
            return Some(format!(
                "Expiration cannot exceed {} days",
                MAX_EXPIRATION_DAYS
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(domain: &str, sources: &[&str]) -> AnalyzeRequest {
        AnalyzeRequest {
            subject_domain: domain.to_string(),
            subject_keywords: Vec::new(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            sort: None,
            order: SortOrder::Desc,
        }
    }

    #[test]
    fn test_analyze_request_deserialize_defaults() {
        let json = r#"{"subject_domain": "example.com"}"#;
        let req: AnalyzeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.subject_domain, "example.com");
        assert!(req.subject_keywords.is_empty());
        assert!(req.sources.is_empty());
        assert!(req.sort.is_none());
        assert_eq!(req.order, SortOrder::Desc);
    }

    #[test]
    fn test_analyze_request_with_sort() {
        let json = r#"{"subject_domain": "example.com", "sources": ["a.com"], "sort": "search_volume", "order": "asc"}"#;
        let req: AnalyzeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.sort, Some(SortColumn::SearchVolume));
        assert_eq!(req.order, SortOrder::Asc);
    }

    #[test]
    fn test_validate_domain() {
        assert!(request("example.com", &["a.com"]).validate().is_none());
        assert!(request("sub.example-site.co.uk", &[]).validate().is_none());
        assert!(request("", &[]).validate().is_some());
        assert!(request("   ", &[]).validate().is_some());
        assert!(request("localhost", &[]).validate().is_some());
        assert!(request("exa mple.com", &[]).validate().is_some());
        assert!(request("https://example.com", &[]).validate().is_some());
    }

    #[test]
    fn test_validate_sources() {
        assert!(request("example.com", &["a.com", " "]).validate().is_some());
    }

    #[test]
    fn test_analyze_request_camel_case() {
        let json = r#"{"subjectDomain": "example.com", "subjectKeywords": [{"keyword": "seo"}]}"#;
        let req: AnalyzeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.subject_domain, "example.com");
        assert_eq!(req.subject_keywords.len(), 1);
    }

    #[test]
    fn test_update_config_accepts_config_body() {
        let body = serde_json::to_string(&crate::cache::CacheConfig { expiration_days: 21 }).unwrap();
        let req: UpdateConfigRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.expiration_days, 21);

        let req: UpdateConfigRequest = serde_json::from_str(r#"{"expiration_days": 3}"#).unwrap();
        assert_eq!(req.expiration_days, 3);
    }

    #[test]
    fn test_update_config_validate() {
        assert!(UpdateConfigRequest { expiration_days: 0 }.validate().is_none());
        assert!(UpdateConfigRequest { expiration_days: 30 }.validate().is_none());
        assert!(UpdateConfigRequest { expiration_days: 366 }.validate().is_some());
    }
}
