//! Keyword Sources
//!
//! The aggregator pulls each source's keyword list through the
//! [`KeywordSource`] trait. Raw records are validated one by one: bad records
//! become [`ParseError`] diagnostics next to the records that parsed.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::model::{KeywordRecord, RankedKeyword};
use crate::error::{ParseError, SourceError};

/// Source id used in diagnostics for the subject's own keyword list
pub const SUBJECT_SOURCE_ID: &str = "subject";

// == Source Handle ==
/// Identifies one keyword source (typically a competitor domain).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle {
    pub id: String,
}

impl SourceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// == Parsed Keywords ==
/// Records that validated, plus the ones that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedKeywords {
    pub keywords: Vec<RankedKeyword>,
    pub diagnostics: Vec<ParseError>,
}

// == Keyword Source ==
/// Fetches the ranked keyword list of a source.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn fetch(&self, source_id: &str) -> Result<ParsedKeywords, SourceError>;
}

// == Record Parsing ==
/// Validates every raw record of `source_id`, keeping the good ones.
pub fn parse_records(source_id: &str, records: &[Value]) -> ParsedKeywords {
    let mut parsed = ParsedKeywords::default();
    for (index, value) in records.iter().enumerate() {
        match parse_record(value) {
            Ok(keyword) => parsed.keywords.push(keyword),
            Err(reason) => {
                let err = ParseError {
                    source_id: source_id.to_string(),
                    index,
                    reason,
                };
                warn!("Rejected keyword record {}", err);
                parsed.diagnostics.push(err);
            }
        }
    }
    parsed
}

/// Validates one raw record. Field names may be camelCase or snake_case.
///
/// `keyword` and `position` are required; a missing volume or difficulty
/// counts as 0.
pub fn parse_record(value: &Value) -> Result<RankedKeyword, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "record is not an object".to_string())?;

    let keyword = match field(obj, &["keyword"]) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_)) => return Err("keyword is empty".to_string()),
        Some(_) => return Err("keyword is not a string".to_string()),
        None => return Err("keyword is missing".to_string()),
    };

    let search_volume = match field(obj, &["searchVolume", "search_volume"]) {
        None => 0,
        Some(v) => non_negative_int(v)
            .ok_or_else(|| format!("search volume {} is not a non-negative integer", v))?,
    };

    let difficulty = match field(obj, &["difficulty", "keyword_difficulty"]) {
        None => 0,
        Some(v) => non_negative_int(v)
            .filter(|d| *d <= 100)
            .ok_or_else(|| format!("difficulty {} is not an integer in 0-100", v))?
            as u8,
    };

    let position = field(obj, &["position", "rank_absolute"])
        .ok_or_else(|| "position is missing".to_string())
        .and_then(|v| {
            non_negative_int(v)
                .filter(|p| *p >= 1 && *p <= u64::from(u32::MAX))
                .ok_or_else(|| format!("position {} is not a positive integer", v))
        })? as u32;

    let cpc = optional_number(obj, &["cpc"])?;
    let etv = optional_number(obj, &["etv", "estimatedTrafficValue", "estimated_traffic_value"])?;

    Ok(RankedKeyword {
        record: KeywordRecord {
            keyword,
            search_volume,
            difficulty,
            cpc,
        },
        position,
        etv,
    })
}

/// First present, non-null field among `names`.
fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn non_negative_int(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn optional_number(obj: &Map<String, Value>, names: &[&str]) -> Result<Option<f64>, String> {
    match field(obj, names) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(Some)
            .ok_or_else(|| format!("{} {} is not a non-negative number", names[0], v)),
    }
}

// == Directory Source ==
/// Reads keyword snapshots from `<dir>/<source_id>.json`.
///
/// A snapshot is either an array of records or an object with a
/// `keywords` array.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, source_id: &str) -> Result<PathBuf, SourceError> {
        let safe = !source_id.is_empty()
            && !source_id.starts_with('.')
            && source_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !safe {
            return Err(SourceError::Unknown(source_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", source_id)))
    }
}

#[async_trait]
impl KeywordSource for DirectorySource {
    async fn fetch(&self, source_id: &str) -> Result<ParsedKeywords, SourceError> {
        let path = self.path_for(source_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::Unknown(source_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let payload: Value = serde_json::from_str(&content)
            .map_err(|e| SourceError::Malformed(format!("{}: {}", source_id, e)))?;
        let records = match &payload {
            Value::Array(records) => records,
            Value::Object(obj) => match obj.get("keywords") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(SourceError::Malformed(format!(
                        "{}: missing keywords array",
                        source_id
                    )))
                }
            },
            _ => {
                return Err(SourceError::Malformed(format!(
                    "{}: expected an array of records",
                    source_id
                )))
            }
        };

        let parsed = parse_records(source_id, records);
        debug!(
            "Loaded {} keywords from '{}' ({} rejected)",
            parsed.keywords.len(),
            source_id,
            parsed.diagnostics.len()
        );
        Ok(parsed)
    }
}
