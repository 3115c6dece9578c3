//! Request and Response models for the keyword gap API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AnalyzeRequest, UpdateConfigRequest};
pub use responses::{CacheStatsResponse, ClearResponse, DeleteResponse, HealthResponse};
