use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use chrono::{DateTime, Utc};
use pacecore::prelude::seconds_between;
use pacecore::{Clock, Fix, ManualClock, PassiveSource, TrackSnapshot, Tracker};
use serde::Serialize;
use std::sync::Arc;

/// Live metrics as they stood after one delivery.
#[derive(Debug, Clone, Serialize)]
pub struct PacePoint {
    pub elapsed_s: f64,
    pub pace_min_per_km: Option<f64>,
    pub distance_m: Option<f64>,
}

pub struct WorkflowResult {
    pub snapshot: Arc<TrackSnapshot>,
    pub pace_trace: Vec<PacePoint>,
    pub debug_export: Vec<Fix>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Replays `fixes` in delivery order against a clock that follows them.
    pub fn execute(&self, fixes: &[Fix]) -> anyhow::Result<WorkflowResult> {
        let first = fixes.first().context("no fixes to replay")?;
        let clock = ManualClock::new(first.timestamp);
        let mut tracker = Tracker::with_clock(
            PassiveSource,
            self.config.tracker.clone(),
            Arc::new(clock.clone()),
        )
        .context("building tracker")?;
        tracker.start();

        let arrivals = arrival_times(fixes);
        let batch_size = self.config.batch_size.max(1);
        let mut pace_trace = Vec::new();
        for (index, batch) in fixes.chunks(batch_size).enumerate() {
            let delivered = arrivals[index * batch_size + batch.len() - 1];
            if delivered > clock.now() {
                clock.set(delivered);
            }
            tracker.ingest(batch);
            pace_trace.push(PacePoint {
                elapsed_s: seconds_between(clock.now(), first.timestamp),
                pace_min_per_km: tracker.pace(),
                distance_m: tracker.total_distance(),
            });
        }

        Ok(WorkflowResult {
            snapshot: tracker.snapshot(),
            pace_trace,
            debug_export: tracker.debug_buffer(),
        })
    }
}

/// Instant each fix is considered delivered at: the earliest stamp among it
/// and every fix after it.
///
/// A fix stamped ahead of the ones that follow it cannot drag the replay
/// clock forward, so the future-timestamp check still sees it as early.
fn arrival_times(fixes: &[Fix]) -> Vec<DateTime<Utc>> {
    let mut arrivals: Vec<DateTime<Utc>> = fixes.iter().map(|fix| fix.timestamp).collect();
    for index in (0..arrivals.len().saturating_sub(1)).rev() {
        arrivals[index] = arrivals[index].min(arrivals[index + 1]);
    }
    arrivals
}
