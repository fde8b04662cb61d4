//! # Availability
//!
//! Segmented bit-vector availability store. Tracks, per entity, whether each
//! time unit is available, and reports any window at any resolution.
//!
//! ## Features
//!
//! - **Compact storage**: one bit per unit, materialized a day at a time
//! - **Any resolution**: coarser reports reduce units with a selectable policy,
//!   finer reports replicate them and trim to the exact window
//! - **Concurrent access**: one async lock per entity
//! - **Snapshots**: the whole collection round-trips through JSON
//!
//! ## Modules
//!
//! - [`storage`]: Core bit-vector storage and resolution conversion
//! - [`store`]: Collections of availabilities keyed by entity id
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use availability::storage::{Availability, ReducePolicy, Resolution};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! // Store at 15 minute units
//! let mut room = Availability::new(Resolution::MINUTE_15).unwrap();
//!
//! let nine = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
//! room.set(nine, nine + Duration::minutes(90), true);
//!
//! // Hourly view: 09:00 is fully free, 10:00 only half
//! let strict = room.get(nine, nine + Duration::hours(2), Resolution::HOUR).unwrap();
//! assert_eq!(strict.data(), &[true, false]);
//!
//! let lenient = room
//!     .get_with_policy(nine, nine + Duration::hours(2), Resolution::HOUR, ReducePolicy::AnyOne)
//!     .unwrap();
//! assert!(lenient.all());
//! ```

pub mod api;
pub mod config;
pub mod storage;
pub mod store;

pub use storage::{Availability, AvailabilityResult, ReducePolicy, Resolution, StorageError};
pub use store::{AvailabilityCollection, MemoryCollection};
