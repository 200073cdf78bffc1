use serde::{Deserialize, Serialize};

/// Alternating fast/slow blocks, for runs that should show pace changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntervalTemplate {
    pub fast_mps: f64,
    pub slow_mps: f64,
    pub fast_s: f64,
    pub slow_s: f64,
}

impl IntervalTemplate {
    /// Speed in effect `elapsed_s` seconds into the run. Each cycle starts fast.
    pub fn speed_at(&self, elapsed_s: f64) -> f64 {
        let period = self.fast_s + self.slow_s;
        if period <= 0.0 {
            return self.fast_mps;
        }
        if elapsed_s.rem_euclid(period) < self.fast_s {
            self.fast_mps
        } else {
            self.slow_mps
        }
    }
}
