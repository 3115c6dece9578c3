//! Payload Codec Module
//!
//! Text-safe reversible encoding for cache entries: JSON, gzip, then base64.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

// == Encode ==
/// Serializes `value` to JSON, compresses it and returns base64 text.
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

// == Decode ==
/// Reverses [`encode`].
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    let compressed = STANDARD.decode(text.trim())?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}
