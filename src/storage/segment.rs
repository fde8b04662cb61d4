//! Bit segments
//!
//! A segment holds one day of units at the storage resolution, packed into
//! 64-bit words:
//!
//! ```text
//! unit:    start  start+1  ...  start+63 | start+64  ...  start+len-1
//! word:    [0] bit 0   bit 1   ...  bit 63  | [1] bit 0  ...
//! ```
//!
//! The segment knows nothing about time. Its owner maps global unit indices to
//! local offsets and guarantees `offset < len`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The number of bits in a storage word.
pub const WORD_LEN: usize = 64;

/// Fixed-capacity bit container for a contiguous block of units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SegmentRecord")]
pub struct BitSegment {
    /// Global index of the unit at offset 0
    start: i64,
    /// Number of units this segment covers
    len: usize,
    words: Vec<u64>,
}

impl BitSegment {
    /// Create an all-zero segment of `len` units starting at unit `start`
    pub fn new(start: i64, len: usize) -> Self {
        Self {
            start,
            len,
            words: vec![0; Self::words_for(len)],
        }
    }

    fn words_for(len: usize) -> usize {
        len.div_ceil(WORD_LEN)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Capacity in units
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit at `offset`
    #[inline]
    pub fn get(&self, offset: usize) -> bool {
        debug_assert!(offset < self.len, "offset {offset} out of segment of {}", self.len);
        let (word, shift) = (offset / WORD_LEN, offset % WORD_LEN);
        (self.words[word] >> shift) & 1 == 1
    }

    /// Sets or clears the bit at `offset`
    #[inline]
    pub fn set(&mut self, offset: usize, value: bool) {
        debug_assert!(offset < self.len, "offset {offset} out of segment of {}", self.len);
        let (word, shift) = (offset / WORD_LEN, offset % WORD_LEN);
        self.words[word] &= !(1u64 << shift);
        self.words[word] |= (value as u64) << shift;
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True if no bit is set
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Heap bytes used by the bit storage
    pub fn size_in_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}

/// Unchecked wire form, validated into a [`BitSegment`]
#[derive(Deserialize)]
struct SegmentRecord {
    start: i64,
    len: usize,
    words: Vec<u64>,
}

impl TryFrom<SegmentRecord> for BitSegment {
    type Error = String;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        let expected = Self::words_for(record.len);
        if record.words.len() != expected {
            return Err(format!(
                "segment {} holds {} words, {} units need {}",
                record.start,
                record.words.len(),
                record.len,
                expected
            ));
        }
        Ok(Self {
            start: record.start,
            len: record.len,
            words: record.words,
        })
    }
}

impl fmt::Display for BitSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for offset in 0..self.len {
            f.write_str(if self.get(offset) { "1" } else { "0" })?;
        }
        Ok(())
    }
}
