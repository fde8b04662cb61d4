//! Segmented bit vector
//!
//! A logically infinite array of bits indexed by `i64` unit, stored as a
//! sparse map of fixed-length [`BitSegment`]s keyed by their first unit.
//! An absent segment reads as all zeros. Segments are materialized on first
//! write and live as long as the vector.
//!
//! Reads and writes walk the requested unit range once, hopping to the next
//! segment whenever the in-segment offset reaches the segment length:
//!
//! ```text
//!            segment k             segment k+1          segment k+2
//! units: |....[######|  ->  |############|  ->  |####]......|
//!             from                                   to
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::storage::segment::BitSegment;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorRecord")]
pub struct SegmentedVector {
    segment_length: usize,
    segments: HashMap<i64, BitSegment>,
}

impl SegmentedVector {
    /// Create an empty vector whose segments hold `segment_length` units
    ///
    /// # Panics
    /// Panics if `segment_length` is zero
    pub fn new(segment_length: usize) -> Self {
        assert!(segment_length > 0, "SegmentedVector: segment length must be positive");
        Self {
            segment_length,
            segments: HashMap::new(),
        }
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// First unit of the segment containing `unit`
    pub fn segment_start(&self, unit: i64) -> i64 {
        unit - unit.rem_euclid(self.segment_length as i64)
    }

    fn offset_of(&self, unit: i64) -> usize {
        unit.rem_euclid(self.segment_length as i64) as usize
    }

    /// Remove the segment starting at `start` from the map, or create a blank one
    fn take_or_create(&mut self, start: i64) -> BitSegment {
        self.segments.remove(&start).unwrap_or_else(|| {
            tracing::trace!(start, len = self.segment_length, "Materializing segment");
            BitSegment::new(start, self.segment_length)
        })
    }

    /// Set every unit in `[from, to)` to `value`. Empty ranges are a no-op.
    pub fn set(&mut self, from: i64, to: i64, value: bool) {
        if to <= from {
            return;
        }

        let mut segment = self.take_or_create(self.segment_start(from));
        let mut offset = self.offset_of(from);

        for unit in from..to {
            if offset == self.segment_length {
                self.segments.insert(segment.start(), segment);
                segment = self.take_or_create(unit);
                offset = 0;
            }
            segment.set(offset, value);
            offset += 1;
        }

        self.segments.insert(segment.start(), segment);
    }

    /// Read every unit in `[from, to)`. The result has exactly `to - from`
    /// entries (none for an empty range); the map is never modified.
    pub fn get(&self, from: i64, to: i64) -> Vec<bool> {
        if to <= from {
            return Vec::new();
        }

        let mut units = Vec::with_capacity((to - from) as usize);
        let mut segment = self.segments.get(&self.segment_start(from));
        let mut offset = self.offset_of(from);

        for unit in from..to {
            if offset == self.segment_length {
                segment = self.segments.get(&unit);
                offset = 0;
            }
            units.push(segment.map_or(false, |s| s.get(offset)));
            offset += 1;
        }

        units
    }

    /// Number of materialized segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Bytes used by segment bit storage
    pub fn size_in_bytes(&self) -> usize {
        self.segments.values().map(BitSegment::size_in_bytes).sum()
    }

    /// Materialized segments ordered by start unit
    pub fn segments(&self) -> Vec<&BitSegment> {
        let mut segments: Vec<&BitSegment> = self.segments.values().collect();
        segments.sort_by_key(|s| s.start());
        segments
    }
}

/// Unchecked wire form, validated into a [`SegmentedVector`]
#[derive(Deserialize)]
struct VectorRecord {
    segment_length: usize,
    segments: HashMap<i64, BitSegment>,
}

impl TryFrom<VectorRecord> for SegmentedVector {
    type Error = String;

    fn try_from(record: VectorRecord) -> Result<Self, Self::Error> {
        let len = record.segment_length;
        if len == 0 {
            return Err("segment length must be positive".to_string());
        }

        for (&key, segment) in &record.segments {
            if segment.start() != key {
                return Err(format!(
                    "segment keyed {} starts at {}",
                    key,
                    segment.start()
                ));
            }
            if key.rem_euclid(len as i64) != 0 {
                return Err(format!("segment {} is not aligned to {} units", key, len));
            }
            if segment.len() != len {
                return Err(format!(
                    "segment {} holds {} units, expected {}",
                    key,
                    segment.len(),
                    len
                ));
            }
        }

        Ok(Self {
            segment_length: len,
            segments: record.segments,
        })
    }
}

impl fmt::Display for SegmentedVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments() {
            writeln!(f, "{}->{}", segment.start(), segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_start_negative_units() {
        let v = SegmentedVector::new(10);
        assert_eq!(v.segment_start(0), 0);
        assert_eq!(v.segment_start(9), 0);
        assert_eq!(v.segment_start(10), 10);
        assert_eq!(v.segment_start(-1), -10);
        assert_eq!(v.segment_start(-10), -10);
        assert_eq!(v.segment_start(-11), -20);
    }

    #[test]
    fn test_get_from_empty() {
        let v = SegmentedVector::new(10);
        assert_eq!(v.get(-5, 25), vec![false; 30]);
        assert_eq!(v.segment_count(), 0);
    }

    #[test]
    fn test_empty_and_reversed_ranges() {
        let mut v = SegmentedVector::new(10);
        v.set(5, 5, true);
        v.set(7, 3, true);
        assert_eq!(v.segment_count(), 0);
        assert!(v.get(5, 5).is_empty());
        assert!(v.get(7, 3).is_empty());
    }

    #[test]
    fn test_single_unit_write() {
        let mut v = SegmentedVector::new(10);
        v.set(3, 4, true);
        assert_eq!(v.get(2, 5), vec![false, true, false]);
        assert_eq!(v.segment_count(), 1);
    }

    #[test]
    fn test_write_at_segment_end() {
        let mut v = SegmentedVector::new(10);
        v.set(9, 10, true);
        v.set(10, 11, true);
        assert_eq!(v.get(8, 12), vec![false, true, true, false]);
        assert_eq!(v.segment_count(), 2);
    }

    #[test]
    fn test_write_across_many_segments() {
        let mut v = SegmentedVector::new(10);
        v.set(5, 37, true);

        let read = v.get(0, 40);
        for (i, bit) in read.iter().enumerate() {
            assert_eq!(*bit, (5..37).contains(&(i as i64)), "unit {}", i);
        }
        assert_eq!(v.segment_count(), 4);
    }

    #[test]
    fn test_crossing_matches_per_segment_writes() {
        let mut crossing = SegmentedVector::new(10);
        crossing.set(-13, 24, true);

        let mut pieces = SegmentedVector::new(10);
        pieces.set(-13, -10, true);
        pieces.set(-10, 0, true);
        pieces.set(0, 10, true);
        pieces.set(10, 20, true);
        pieces.set(20, 24, true);

        assert_eq!(crossing.get(-30, 40), pieces.get(-30, 40));
    }

    #[test]
    fn test_clear_across_boundary() {
        let mut v = SegmentedVector::new(10);
        v.set(0, 30, true);
        v.set(8, 12, false);

        let read = v.get(6, 14);
        assert_eq!(
            read,
            vec![true, true, false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_read_does_not_materialize() {
        let mut v = SegmentedVector::new(10);
        v.set(0, 1, true);
        let _ = v.get(-100, 100);
        assert_eq!(v.segment_count(), 1);
    }

    #[test]
    fn test_size_and_display() {
        let mut v = SegmentedVector::new(4);
        v.set(2, 5, true);
        assert_eq!(v.size_in_bytes(), 16);
        assert_eq!(v.to_string(), "0->0011\n4->1000\n");
    }

    #[test]
    fn test_serde_roundtrip_keeps_bits() {
        let mut v = SegmentedVector::new(10);
        v.set(-4, 15, true);

        let json = serde_json::to_string(&v).unwrap();
        let restored: SegmentedVector = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.segment_length(), 10);
        assert_eq!(restored.get(-10, 20), v.get(-10, 20));
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_segments() {
        let segment = r#"{"start": 10, "len": 10, "words": [0]}"#;

        let zero_length = r#"{"segment_length": 0, "segments": {}}"#;
        assert!(serde_json::from_str::<SegmentedVector>(zero_length).is_err());

        let wrong_key = format!(r#"{{"segment_length": 10, "segments": {{"20": {}}}}}"#, segment);
        assert!(serde_json::from_str::<SegmentedVector>(&wrong_key).is_err());

        let wrong_length = format!(r#"{{"segment_length": 5, "segments": {{"10": {}}}}}"#, segment);
        assert!(serde_json::from_str::<SegmentedVector>(&wrong_length).is_err());

        let unaligned = r#"{"segment_length": 10, "segments": {"3": {"start": 3, "len": 10, "words": [0]}}}"#;
        assert!(serde_json::from_str::<SegmentedVector>(unaligned).is_err());

        let valid = format!(r#"{{"segment_length": 10, "segments": {{"10": {}}}}}"#, segment);
        let v: SegmentedVector = serde_json::from_str(&valid).unwrap();
        assert_eq!(v.segment_count(), 1);
    }
}
