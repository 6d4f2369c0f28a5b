//! Energy metering: integrates power samples into a running kWh total.
//!
//! Each sample is treated as constant over the interval since the previous
//! sample (rectangular integration):
//!
//! ```text
//! total += power_watts / 3_600_000 * elapsed_seconds
//! ```

use crate::time::{Timestamp, elapsed_secs};

/// Watt-seconds per kilowatt-hour.
const WATT_SECONDS_PER_KWH: f64 = 3_600_000.0;

/// Running energy total for a single room.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyMeter {
    consumption_kwh: f64,
    last_update: Timestamp,
}

impl EnergyMeter {
    /// A meter starting at zero.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self::restored(0.0, start)
    }

    /// A meter continuing from a persisted total.
    #[must_use]
    pub fn restored(consumption_kwh: f64, start: Timestamp) -> Self {
        Self {
            consumption_kwh,
            last_update: start,
        }
    }

    /// Integrate one power sample taken at `at` and return the new total.
    ///
    /// Elapsed time keeps millisecond precision rather than flooring to
    /// whole seconds, so samples less than a second apart still count.
    ///
    /// Negative or non-finite power is rejected with `None` and leaves the
    /// meter untouched, including its timestamp.
    pub fn record(&mut self, power_watts: f64, at: Timestamp) -> Option<f64> {
        if !power_watts.is_finite() || power_watts < 0.0 {
            return None;
        }
        let elapsed = elapsed_secs(self.last_update, at);
        self.consumption_kwh += power_watts / WATT_SECONDS_PER_KWH * elapsed;
        self.last_update = at;
        Some(self.consumption_kwh)
    }

    #[must_use]
    pub fn consumption_kwh(&self) -> f64 {
        self.consumption_kwh
    }

    #[must_use]
    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }
}
