//! Availability Storage Engine
//!
//! This module provides the core bit-vector storage and resolution
//! conversion:
//!
//! - **resolution**: Seconds-per-unit vocabulary and token parsing
//! - **time_unit**: Instant to unit index mapping, floor/ceil rounding
//! - **segment**: Fixed-capacity bit segment holding one day of units
//! - **vector**: Sparse map of segments forming an unbounded bit array
//! - **resample**: Reduction (downsampling) and expansion (upsampling)
//! - **availability**: Time-domain façade over a segmented vector
//! - **result**: Immutable query results
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   (from, to) → unit_floor @ storage → SegmentedVector::set → BitSegment::set
//!
//! Read Path:
//!   (from, to, R) → align window → SegmentedVector::get → reduce | expand | as-is
//!                 → AvailabilityResult
//! ```
//!
//! # Example
//!
//! ```rust
//! use availability::storage::{Availability, Resolution};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let mut av = Availability::new(Resolution::MINUTE_5).unwrap();
//! let t1 = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
//!
//! av.set(t1, t1 + Duration::minutes(15), true);
//!
//! let quarter = av.get(t1, t1 + Duration::minutes(15), Resolution::MINUTE_15).unwrap();
//! assert!(quarter.all());
//!
//! let minutes = av.get(t1, t1 + Duration::minutes(5), Resolution::MINUTE).unwrap();
//! assert_eq!(minutes.count(), 5);
//! ```

pub mod availability;
pub mod error;
pub mod resample;
pub mod resolution;
pub mod result;
pub mod segment;
pub mod time_unit;
pub mod vector;

// Re-export commonly used types
pub use availability::Availability;
pub use error::{StorageError, StorageResult};
pub use resample::{multiply_by_factor, reduce_by_factor, ReducePolicy};
pub use resolution::Resolution;
pub use result::AvailabilityResult;
pub use segment::BitSegment;
pub use time_unit::{round_down, round_up, unit_ceil, unit_floor, unit_start};
pub use vector::SegmentedVector;
