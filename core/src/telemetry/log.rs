use log::{debug, info};

use crate::fix_interface::Fix;
use crate::processing::filter::RejectReason;

const TARGET: &str = "pacecore::intake";

/// Thin wrapper over the `log` facade for intake events.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!(target: TARGET, "{}", message);
    }

    pub fn rejected(&self, fix: &Fix, reason: RejectReason) {
        debug!(
            target: TARGET,
            "rejected fix at {} ({:.6}, {:.6}) acc={:.1}m speed={:.2}m/s: {:?}",
            fix.timestamp,
            fix.latitude,
            fix.longitude,
            fix.horizontal_accuracy,
            fix.speed,
            reason
        );
    }

    pub fn batch(&self, received: usize, accepted: usize, evicted: usize, track_len: usize) {
        debug!(
            target: TARGET,
            "batch of {} fixes: {} accepted, {} evicted, track holds {}",
            received,
            accepted,
            evicted,
            track_len
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
