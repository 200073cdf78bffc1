use serde::Serialize;

use crate::processing::filter::{RejectReason, Verdict};

/// Per-reason tallies of every fix the tracker has classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounters {
    pub received: usize,
    pub accepted: usize,
    pub invalid_coordinates: usize,
    pub invalid_accuracy: usize,
    pub poor_accuracy: usize,
    pub future_timestamp: usize,
    pub invalid_speed: usize,
}

impl IngestCounters {
    pub fn rejected(&self) -> usize {
        self.received - self.accepted
    }
}

pub struct MetricsRecorder {
    counters: IngestCounters,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            counters: IngestCounters::default(),
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.counters.received += 1;
        match verdict {
            Verdict::Accepted => self.counters.accepted += 1,
            Verdict::Rejected(RejectReason::NonFiniteCoordinates) => {
                self.counters.invalid_coordinates += 1
            }
            Verdict::Rejected(RejectReason::InvalidAccuracy) => self.counters.invalid_accuracy += 1,
            Verdict::Rejected(RejectReason::PoorAccuracy) => self.counters.poor_accuracy += 1,
            Verdict::Rejected(RejectReason::FutureTimestamp) => self.counters.future_timestamp += 1,
            Verdict::Rejected(RejectReason::InvalidSpeed) => self.counters.invalid_speed += 1,
        }
    }

    pub fn snapshot(&self) -> IngestCounters {
        self.counters
    }

    pub fn reset(&mut self) {
        self.counters = IngestCounters::default();
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_split_by_reason() {
        let mut recorder = MetricsRecorder::new();
        recorder.record(Verdict::Accepted);
        recorder.record(Verdict::Rejected(RejectReason::PoorAccuracy));
        recorder.record(Verdict::Rejected(RejectReason::PoorAccuracy));
        recorder.record(Verdict::Rejected(RejectReason::InvalidSpeed));

        let counters = recorder.snapshot();
        assert_eq!(counters.received, 4);
        assert_eq!(counters.accepted, 1);
        assert_eq!(counters.poor_accuracy, 2);
        assert_eq!(counters.rejected(), 3);

        recorder.reset();
        assert_eq!(recorder.snapshot(), IngestCounters::default());
    }
}
