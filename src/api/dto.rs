//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::AvailabilityResult;

// ============================================
// ENTITY DTOs
// ============================================

/// Create availability request
#[derive(Debug, Deserialize)]
pub struct CreateAvailabilityRequest {
    /// Entity identifier
    pub id: String,
    /// Storage resolution label, defaults to the configured one
    #[serde(default)]
    pub resolution: Option<String>,
}

/// One entity's storage summary
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityInfo {
    pub id: String,
    pub resolution: String,
    pub segments: usize,
    pub size_bytes: usize,
}

/// List of entities
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityListResponse {
    pub availabilities: Vec<AvailabilityInfo>,
    pub total: usize,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: String,
    pub id: String,
}

// ============================================
// WRITE DTOs
// ============================================

/// Set a range of units
#[derive(Debug, Deserialize)]
pub struct SetRangeRequest {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub available: bool,
}

/// Set the unit containing one instant
#[derive(Debug, Deserialize)]
pub struct SetAtRequest {
    pub at: DateTime<Utc>,
    pub available: bool,
}

/// Write acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteResponse {
    /// Status: "ok"
    pub status: String,
    pub id: String,
    /// Storage resolution the write was aligned to
    pub resolution: String,
}

// ============================================
// QUERY DTOs
// ============================================

/// Range query parameters
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Reporting resolution label, defaults to the storage resolution
    #[serde(default)]
    pub resolution: Option<String>,
    /// Reduction policy for coarser reports: all, any, majority
    #[serde(default)]
    pub policy: Option<String>,
}

/// Range query response
#[derive(Debug, Serialize)]
pub struct RangeResponse {
    #[serde(flatten)]
    pub result: AvailabilityResult,
    pub all: bool,
    pub any: bool,
    pub count: usize,
}

impl From<AvailabilityResult> for RangeResponse {
    fn from(result: AvailabilityResult) -> Self {
        Self {
            all: result.all(),
            any: result.any(),
            count: result.count(),
            result,
        }
    }
}

/// Point query parameters
#[derive(Debug, Deserialize)]
pub struct AtQuery {
    pub at: DateTime<Utc>,
}

/// Point query response
#[derive(Debug, Serialize, Deserialize)]
pub struct AtResponse {
    pub id: String,
    pub at: DateTime<Utc>,
    pub available: bool,
    pub resolution: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy
    pub status: String,
    /// Number of tracked entities
    pub entities: usize,
    /// Materialized segments across all entities
    pub segments: usize,
    /// Bytes held by segment words
    pub size_bytes: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
