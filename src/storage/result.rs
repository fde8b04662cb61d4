//! Query results
//!
//! An [`AvailabilityResult`] is an immutable snapshot of one query. The end
//! of its window is always derived from the start, the data length and the
//! reporting resolution, so the window can never disagree with the data.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::storage::resolution::Resolution;

/// Availability over `[from, to)` reported at `resolution`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResult {
    resolution: Resolution,
    storage_resolution: Resolution,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    data: Vec<bool>,
}

impl AvailabilityResult {
    pub fn new(
        resolution: Resolution,
        storage_resolution: Resolution,
        data: Vec<bool>,
        from: DateTime<Utc>,
    ) -> Self {
        let to = from + Duration::seconds(data.len() as i64 * resolution.secs());
        Self {
            resolution,
            storage_resolution,
            from,
            to,
            data,
        }
    }

    /// Reporting resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Resolution the data was derived from
    pub fn storage_resolution(&self) -> Resolution {
        self.storage_resolution
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if every unit is available (vacuously true when empty)
    pub fn all(&self) -> bool {
        self.data.iter().all(|&b| b)
    }

    /// True if at least one unit is available
    pub fn any(&self) -> bool {
        self.data.iter().any(|&b| b)
    }

    /// Number of available units
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }

    /// Data as 0/1 integers
    pub fn to_ints(&self) -> Vec<u8> {
        self.data.iter().map(|&b| u8::from(b)).collect()
    }
}

/// Wire form: labels for resolutions, RFC 3339 timestamps, 0/1 integers
#[derive(Serialize)]
struct ResultRecord {
    resolution: String,
    internal_resolution: String,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    available: Vec<u8>,
}

impl Serialize for AvailabilityResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultRecord {
            resolution: self.resolution.label(),
            internal_resolution: self.storage_resolution.label(),
            from: self.from,
            to: self.to,
            available: self.to_ints(),
        }
        .serialize(serializer)
    }
}

impl fmt::Display for AvailabilityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "AvailabilityResult {{res: {}, from: {},",
            self.resolution,
            self.from.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        let cells: Vec<&str> = self
            .data
            .iter()
            .map(|&b| if b { "1" } else { "0" })
            .collect();
        writeln!(f, "data: [{}],", cells.join(", "))?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1982, 2, 7, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_window_is_derived() {
        let result = AvailabilityResult::new(
            Resolution::MINUTE_15,
            Resolution::MINUTE_5,
            vec![true, false, true],
            t0(),
        );
        assert_eq!(result.to(), t0() + Duration::minutes(45));
        assert_eq!(
            (result.to() - result.from()).num_seconds(),
            result.len() as i64 * result.resolution().secs()
        );
    }

    #[test]
    fn test_empty_result() {
        let result =
            AvailabilityResult::new(Resolution::MINUTE_5, Resolution::MINUTE_5, vec![], t0());
        assert!(result.is_empty());
        assert_eq!(result.from(), result.to());
        assert!(result.all());
        assert!(!result.any());
        assert_eq!(result.count(), 0);
    }

    #[test]
    fn test_predicates() {
        let result = AvailabilityResult::new(
            Resolution::HOUR,
            Resolution::MINUTE,
            vec![true, false, true, true],
            t0(),
        );
        assert!(!result.all());
        assert!(result.any());
        assert_eq!(result.count(), 3);
        assert_eq!(result.storage_resolution(), Resolution::MINUTE);
    }

    #[test]
    fn test_serialization() {
        let result = AvailabilityResult::new(
            Resolution::MINUTE_15,
            Resolution::MINUTE_5,
            vec![true, false],
            t0(),
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["resolution"], "15min");
        assert_eq!(json["internal_resolution"], "5min");
        assert_eq!(json["from"], "1982-02-07T00:00:00Z");
        assert_eq!(json["to"], "1982-02-07T00:30:00Z");
        assert_eq!(json["available"], serde_json::json!([1, 0]));
    }

    #[test]
    fn test_display() {
        let result = AvailabilityResult::new(
            Resolution::MINUTE_5,
            Resolution::MINUTE_5,
            vec![false, true],
            t0(),
        );
        assert_eq!(
            result.to_string(),
            "AvailabilityResult {res: 5min, from: 1982-02-07T00:00:00Z,\ndata: [0, 1],\n}"
        );
    }
}
