//! Resolution conversion of unit arrays
//!
//! - [`reduce_by_factor`] collapses every window of `factor` units into one
//!   (coarser reporting), using a [`ReducePolicy`].
//! - [`multiply_by_factor`] repeats every unit `factor` times (finer
//!   reporting).
//!
//! Neither handles partial windows. Callers align the time window to the
//! coarser resolution first, so the input length is always a whole number of
//! windows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a window of storage units reduces to one reported unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducePolicy {
    /// Set iff every unit in the window is set (fully available)
    #[default]
    AllOnes,
    /// Set iff at least one unit in the window is set
    AnyOne,
    /// Set iff strictly more than half of the window is set
    Majority,
}

impl ReducePolicy {
    /// Reduce one window
    pub fn reduce(&self, window: &[bool]) -> bool {
        match self {
            ReducePolicy::AllOnes => window.iter().all(|&b| b),
            ReducePolicy::AnyOne => window.iter().any(|&b| b),
            ReducePolicy::Majority => {
                let ones = window.iter().filter(|&&b| b).count();
                ones > window.len() / 2
            }
        }
    }
}

impl fmt::Display for ReducePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducePolicy::AllOnes => write!(f, "all"),
            ReducePolicy::AnyOne => write!(f, "any"),
            ReducePolicy::Majority => write!(f, "majority"),
        }
    }
}

impl FromStr for ReducePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "all_ones" => Ok(ReducePolicy::AllOnes),
            "any" | "any_one" => Ok(ReducePolicy::AnyOne),
            "majority" => Ok(ReducePolicy::Majority),
            other => Err(format!(
                "Unknown reduce policy '{}', expected one of: all, any, majority",
                other
            )),
        }
    }
}

/// Collapse consecutive windows of `factor` units into one unit each
///
/// # Panics
/// Panics if `factor` is zero or does not divide `units.len()`. A partial
/// window means the caller skipped aligning the query window.
pub fn reduce_by_factor(units: &[bool], factor: usize, policy: ReducePolicy) -> Vec<bool> {
    assert!(factor > 0, "reduce_by_factor: factor must be positive");
    assert!(
        units.len() % factor == 0,
        "reduce_by_factor: {} units do not split into windows of {}",
        units.len(),
        factor
    );

    units
        .chunks_exact(factor)
        .map(|window| policy.reduce(window))
        .collect()
}

/// Repeat every unit `factor` times
pub fn multiply_by_factor(units: &[bool], factor: usize) -> Vec<bool> {
    let mut expanded = Vec::with_capacity(units.len() * factor);
    for &unit in units {
        expanded.extend(std::iter::repeat(unit).take(factor));
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_reduce_all_ones() {
        let reduced = reduce_by_factor(&bits("111110011"), 3, ReducePolicy::AllOnes);
        assert_eq!(reduced, bits("100"));
    }

    #[test]
    fn test_reduce_any_one() {
        let reduced = reduce_by_factor(&bits("000010011"), 3, ReducePolicy::AnyOne);
        assert_eq!(reduced, bits("011"));
    }

    #[test]
    fn test_reduce_majority() {
        // 2 of 3, 1 of 3, 2 of 4 is not a strict majority
        assert_eq!(
            reduce_by_factor(&bits("110100"), 3, ReducePolicy::Majority),
            bits("10")
        );
        assert_eq!(
            reduce_by_factor(&bits("11001110"), 4, ReducePolicy::Majority),
            bits("01")
        );
    }

    #[test]
    fn test_reduce_factor_one_is_identity() {
        let units = bits("1011");
        assert_eq!(reduce_by_factor(&units, 1, ReducePolicy::AllOnes), units);
    }

    #[test]
    fn test_reduce_empty() {
        assert!(reduce_by_factor(&[], 3, ReducePolicy::AllOnes).is_empty());
    }

    #[test]
    #[should_panic(expected = "do not split into windows")]
    fn test_reduce_misaligned_panics() {
        reduce_by_factor(&bits("11111"), 3, ReducePolicy::AllOnes);
    }

    #[test]
    fn test_multiply() {
        assert_eq!(multiply_by_factor(&bits("101"), 2), bits("110011"));
        assert_eq!(multiply_by_factor(&bits("1"), 5), bits("11111"));
        assert!(multiply_by_factor(&[], 4).is_empty());
    }

    #[test]
    fn test_multiply_then_reduce_restores() {
        let units = bits("1001101");
        let expanded = multiply_by_factor(&units, 3);
        assert_eq!(reduce_by_factor(&expanded, 3, ReducePolicy::AllOnes), units);
        assert_eq!(reduce_by_factor(&expanded, 3, ReducePolicy::AnyOne), units);
    }

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!("all".parse::<ReducePolicy>(), Ok(ReducePolicy::AllOnes));
        assert_eq!("ANY".parse::<ReducePolicy>(), Ok(ReducePolicy::AnyOne));
        assert_eq!("majority".parse::<ReducePolicy>(), Ok(ReducePolicy::Majority));
        assert!("most".parse::<ReducePolicy>().is_err());
        assert_eq!(ReducePolicy::default(), ReducePolicy::AllOnes);
        assert_eq!(ReducePolicy::AnyOne.to_string(), "any");
    }
}
