//! In-memory availability collection
//!
//! Entries live in a `HashMap` behind a Tokio `RwLock`. The whole collection
//! can be written to and restored from a JSON snapshot file.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AvailabilityCollection, CollectionStats, SharedAvailability, StoreError, StoreResult};
use crate::storage::{Availability, Resolution, StorageResult};

#[derive(Default)]
pub struct MemoryCollection {
    entries: RwLock<HashMap<String, SharedAvailability>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a collection from a snapshot file; a missing file yields an
    /// empty collection
    pub fn load_snapshot(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        let snapshot: BTreeMap<String, Availability> = serde_json::from_str(&content)?;

        tracing::info!(path = ?path, entities = snapshot.len(), "Loaded availability snapshot");

        let entries = snapshot
            .into_iter()
            .map(|(id, av)| (id, Arc::new(RwLock::new(av))))
            .collect();

        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Write every entry to a snapshot file
    pub async fn save_snapshot(&self, path: &Path) -> StorageResult<()> {
        let mut snapshot = BTreeMap::new();
        {
            let entries = self.entries.read().await;
            for (id, shared) in entries.iter() {
                snapshot.insert(id.clone(), shared.read().await.clone());
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(&snapshot)?;
        std::fs::write(path, content)?;

        tracing::info!(path = ?path, entities = snapshot.len(), "Saved availability snapshot");
        Ok(())
    }
}

#[async_trait]
impl AvailabilityCollection for MemoryCollection {
    async fn find(&self, id: &str) -> Option<SharedAvailability> {
        self.entries.read().await.get(id).cloned()
    }

    async fn find_or_create(
        &self,
        id: &str,
        resolution: Resolution,
    ) -> StoreResult<SharedAvailability> {
        if let Some(found) = self.find(id).await {
            return Ok(found);
        }

        let mut entries = self.entries.write().await;
        // Another writer may have won the race between the two locks
        if let Some(found) = entries.get(id) {
            return Ok(Arc::clone(found));
        }

        let shared = Arc::new(RwLock::new(Availability::new(resolution)?));
        entries.insert(id.to_string(), Arc::clone(&shared));
        tracing::info!(id, %resolution, "Created availability");
        Ok(shared)
    }

    async fn create(&self, id: &str, resolution: Resolution) -> StoreResult<SharedAvailability> {
        let availability = Availability::new(resolution)?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }

        let shared = Arc::new(RwLock::new(availability));
        entries.insert(id.to_string(), Arc::clone(&shared));
        tracing::info!(id, %resolution, "Created availability");
        Ok(shared)
    }

    async fn save(&self, id: &str, availability: Availability) -> SharedAvailability {
        let shared = Arc::new(RwLock::new(availability));
        self.entries
            .write()
            .await
            .insert(id.to_string(), Arc::clone(&shared));
        shared
    }

    async fn remove(&self, id: &str) -> bool {
        let removed = self.entries.write().await.remove(id).is_some();
        if removed {
            tracing::info!(id, "Removed availability");
        }
        removed
    }

    async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn stats(&self) -> CollectionStats {
        let entries = self.entries.read().await;
        let mut stats = CollectionStats {
            entities: entries.len(),
            ..Default::default()
        };
        for shared in entries.values() {
            let av = shared.read().await;
            stats.segments += av.segment_count();
            stats.size_bytes += av.size_in_bytes();
        }
        stats
    }
}
