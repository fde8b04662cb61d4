//! Availability Collections
//!
//! Maps opaque entity identifiers to [`Availability`] instances. Every
//! instance sits behind its own async lock, so concurrent requests for
//! different entities never contend, and the core algorithms stay
//! single-threaded.
//!
//! - [`AvailabilityCollection`]: find / create / replace / remove by id
//! - [`MemoryCollection`]: in-process map with optional JSON snapshots

mod memory;

pub use memory::MemoryCollection;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{Availability, Resolution, StorageError};

/// Handle to one entity's availability
pub type SharedAvailability = Arc<RwLock<Availability>>;

/// Identity lookup for availability instances
#[async_trait]
pub trait AvailabilityCollection: Send + Sync {
    /// Look up an entity; unknown ids yield `None`
    async fn find(&self, id: &str) -> Option<SharedAvailability>;

    /// Look up an entity, creating it at `resolution` if it does not exist
    async fn find_or_create(&self, id: &str, resolution: Resolution)
        -> StoreResult<SharedAvailability>;

    /// Create a new entity, failing if the id is taken
    async fn create(&self, id: &str, resolution: Resolution) -> StoreResult<SharedAvailability>;

    /// Store `availability` under `id`, replacing any previous entry
    async fn save(&self, id: &str, availability: Availability) -> SharedAvailability;

    /// Remove an entity, returning whether it existed
    async fn remove(&self, id: &str) -> bool;

    /// All known ids, sorted
    async fn ids(&self) -> Vec<String>;

    /// Aggregate storage figures
    async fn stats(&self) -> CollectionStats;
}

/// Collection-wide storage figures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub entities: usize,
    pub segments: usize,
    pub size_bytes: usize,
}

impl std::fmt::Display for CollectionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entities: {}, Segments: {}, Size: {:.2} KB",
            self.entities,
            self.segments,
            self.size_bytes as f64 / 1024.0
        )
    }
}

/// Errors from collection operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Availability '{0}' already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for collection operations
pub type StoreResult<T> = Result<T, StoreError>;
