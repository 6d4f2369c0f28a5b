//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_changed`, `last_updated`, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Seconds elapsed between two timestamps, millisecond precision.
///
/// Returns `0.0` when `to` is earlier than `from` (clock stepped back).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_secs(from: Timestamp, to: Timestamp) -> f64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / 1000.0
    }
}
