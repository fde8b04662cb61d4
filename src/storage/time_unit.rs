//! Mapping between instants and unit indices
//!
//! Unit `n` at resolution `r` covers `[n * r, (n + 1) * r)` seconds since the
//! Unix epoch. Indices are negative before the epoch, and every function here
//! uses Euclidean division so floor and ceil stay exact on both sides of it.
//! Sub-second precision is dropped: an instant belongs to the unit of its
//! whole epoch second.

use chrono::{DateTime, Duration, Utc};

use crate::storage::resolution::Resolution;

/// Index of the unit containing `instant`
pub fn unit_floor(instant: DateTime<Utc>, res: Resolution) -> i64 {
    debug_assert!(res.is_defined(), "unit_floor requires a defined resolution");
    instant.timestamp().div_euclid(res.secs())
}

/// Index of the first unit starting at or after `instant`
pub fn unit_ceil(instant: DateTime<Utc>, res: Resolution) -> i64 {
    unit_floor(round_up(instant, res), res)
}

/// Start of the unit containing `instant`
pub fn round_down(instant: DateTime<Utc>, res: Resolution) -> DateTime<Utc> {
    debug_assert!(res.is_defined(), "round_down requires a defined resolution");
    let excess = instant.timestamp().rem_euclid(res.secs());
    instant
        - Duration::seconds(excess)
        - Duration::nanoseconds(i64::from(instant.timestamp_subsec_nanos()))
}

/// Start of the first unit at or after `instant`
pub fn round_up(instant: DateTime<Utc>, res: Resolution) -> DateTime<Utc> {
    let down = round_down(instant, res);
    if instant.timestamp().rem_euclid(res.secs()) == 0 {
        down
    } else {
        down + Duration::seconds(res.secs())
    }
}

/// First instant of unit `unit`
pub fn unit_start(unit: i64, res: Resolution) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(unit * res.secs())
}
