//! Availability façade
//!
//! Combines a fixed storage resolution with a [`SegmentedVector`] and exposes
//! time-domain reads and writes. Writes always land on the storage unit grid.
//! Reads pick one of three paths by comparing the requested resolution `R`
//! with the storage resolution `S`:
//!
//! ```text
//! R > S  round window out to R, read S units, reduce by R/S  (downsample)
//! R < S  read covering S units, expand by S/R, trim to window (upsample)
//! R = S  read S units as stored
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::resample::{multiply_by_factor, reduce_by_factor, ReducePolicy};
use crate::storage::resolution::Resolution;
use crate::storage::result::AvailabilityResult;
use crate::storage::time_unit::{round_down, round_up, unit_ceil, unit_floor};
use crate::storage::vector::SegmentedVector;

/// Binary availability of one entity over time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "AvailabilityRecord")]
pub struct Availability {
    resolution: Resolution,
    units: SegmentedVector,
}

/// Unchecked wire form, validated into an [`Availability`]
#[derive(Deserialize)]
struct AvailabilityRecord {
    resolution: Resolution,
    units: SegmentedVector,
}

impl TryFrom<AvailabilityRecord> for Availability {
    type Error = String;

    /// Segments must hold exactly one day at the stored resolution
    fn try_from(record: AvailabilityRecord) -> Result<Self, Self::Error> {
        let mut availability =
            Availability::new(record.resolution).map_err(|e| e.to_string())?;

        if record.units.segment_length() != availability.units.segment_length() {
            return Err(format!(
                "segments of {} units do not hold one day at {}",
                record.units.segment_length(),
                record.resolution
            ));
        }

        availability.units = record.units;
        Ok(availability)
    }
}

impl Availability {
    /// Create an empty availability stored at `resolution`.
    ///
    /// One segment holds one day, so the resolution must divide a day evenly.
    pub fn new(resolution: Resolution) -> StorageResult<Self> {
        if !resolution.is_defined() {
            return Err(StorageError::UndefinedResolution);
        }
        let segment_length = resolution
            .units_per_day()
            .ok_or_else(|| StorageError::InvalidStorageResolution(resolution.label()))?;

        Ok(Self {
            resolution,
            units: SegmentedVector::new(segment_length),
        })
    }

    /// Storage resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Mark `[from, to)` as available or not, at storage resolution
    pub fn set(&mut self, from: DateTime<Utc>, to: DateTime<Utc>, value: bool) {
        let from_unit = unit_floor(from, self.resolution);
        let to_unit = unit_floor(to, self.resolution);
        self.units.set(from_unit, to_unit, value);
    }

    /// Mark the storage unit containing `at`
    pub fn set_at(&mut self, at: DateTime<Utc>, value: bool) {
        let unit = unit_floor(at, self.resolution);
        self.units.set(unit, unit + 1, value);
    }

    /// Value of the storage unit containing `at`
    pub fn get_at(&self, at: DateTime<Utc>) -> bool {
        let unit = unit_floor(at, self.resolution);
        self.units.get(unit, unit + 1).first().copied().unwrap_or(false)
    }

    /// Query `[from, to)` at `resolution`, reducing with [`ReducePolicy::AllOnes`]
    pub fn get(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        resolution: Resolution,
    ) -> StorageResult<AvailabilityResult> {
        self.get_with_policy(from, to, resolution, ReducePolicy::AllOnes)
    }

    /// Query `[from, to)` at `resolution`; `policy` applies when downsampling
    pub fn get_with_policy(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        resolution: Resolution,
        policy: ReducePolicy,
    ) -> StorageResult<AvailabilityResult> {
        let storage = self.resolution;
        let factor = conversion_factor(resolution, storage)?;

        if to <= from {
            return Ok(AvailabilityResult::new(
                resolution,
                storage,
                Vec::new(),
                round_down(from, resolution),
            ));
        }

        match resolution.cmp(&storage) {
            Ordering::Greater => {
                let start = round_down(from, resolution);
                let end = round_up(to, resolution);
                let raw = self
                    .units
                    .get(unit_floor(start, storage), unit_floor(end, storage));

                tracing::debug!(
                    %resolution, %storage, factor, %policy, units = raw.len(),
                    "Downsampling availability"
                );

                let data = reduce_by_factor(&raw, factor, policy);
                Ok(AvailabilityResult::new(resolution, storage, data, start))
            }
            Ordering::Less => {
                let first = unit_floor(from, storage);
                let last = unit_ceil(to, storage);
                let expanded = multiply_by_factor(&self.units.get(first, last), factor);

                let window_start = unit_floor(from, resolution);
                let cutoff = (window_start - first * factor as i64) as usize;
                let len = (unit_floor(to, resolution) - window_start) as usize;

                tracing::debug!(
                    %resolution, %storage, factor, cutoff, len,
                    "Upsampling availability"
                );

                let data = expanded[cutoff..cutoff + len].to_vec();
                Ok(AvailabilityResult::new(
                    resolution,
                    storage,
                    data,
                    round_down(from, resolution),
                ))
            }
            Ordering::Equal => {
                let data = self
                    .units
                    .get(unit_floor(from, storage), unit_floor(to, storage));
                Ok(AvailabilityResult::new(
                    resolution,
                    storage,
                    data,
                    round_down(from, storage),
                ))
            }
        }
    }

    /// Number of materialized day segments
    pub fn segment_count(&self) -> usize {
        self.units.segment_count()
    }

    /// Bytes used by bit storage
    pub fn size_in_bytes(&self) -> usize {
        self.units.size_in_bytes()
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.units)
    }
}

/// Ratio between the coarser and the finer of two resolutions.
///
/// Resolutions that are not whole multiples of one another are rejected
/// rather than silently truncated.
fn conversion_factor(requested: Resolution, storage: Resolution) -> StorageResult<usize> {
    if !requested.is_defined() {
        return Err(StorageError::UndefinedResolution);
    }

    let (coarse, fine) = if requested >= storage {
        (requested, storage)
    } else {
        (storage, requested)
    };

    if coarse.secs() % fine.secs() != 0 {
        return Err(StorageError::IncompatibleResolution {
            requested: requested.label(),
            storage: storage.label(),
        });
    }

    Ok((coarse.secs() / fine.secs()) as usize)
}
