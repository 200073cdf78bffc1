//! Lifecycle owner of the intake pipeline.
//!
//! The tracker is the single writer of both buffers. Every mutation ends with
//! a fresh [`TrackSnapshot`] on a watch channel so readers on other threads
//! never touch buffer state.

mod snapshot;

pub use snapshot::{TrackSnapshot, TrackerState};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::fix_interface::{Clock, Fix, FixSource, SystemClock};
use crate::prelude::{PipelineResult, TrackerConfig};
use crate::processing::distance::{format_distance, total_distance};
use crate::processing::filter::{FixFilter, Verdict};
use crate::processing::pace::{format_pace, PaceEstimator};
use crate::processing::rolling::{DebugBuffer, LoggedFix, TrackBuffer};
use crate::telemetry::{IngestCounters, LogManager, MetricsRecorder};

pub struct Tracker<S: FixSource> {
    source: S,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
    filter: FixFilter,
    pace: PaceEstimator,
    state: TrackerState,
    debug: DebugBuffer,
    track: TrackBuffer,
    metrics: MetricsRecorder,
    logger: LogManager,
    publisher: watch::Sender<Arc<TrackSnapshot>>,
}

impl<S: FixSource> Tracker<S> {
    pub fn new(source: S, config: TrackerConfig) -> PipelineResult<Self> {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: S,
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
    ) -> PipelineResult<Self> {
        config.validate()?;

        let mut tracker = Self {
            source,
            clock,
            filter: FixFilter::new(config.filter.clone()),
            pace: PaceEstimator::new(config.pace_window_s),
            state: TrackerState::Idle,
            debug: DebugBuffer::with_limits(config.debug_window),
            track: TrackBuffer::default(),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
            publisher: watch::channel(Arc::new(empty_snapshot())).0,
            config,
        };
        tracker.publish();
        Ok(tracker)
    }

    /// Asks the source for authorization and updates, then accepts fixes.
    ///
    /// Calling it while tracking only re-issues the requests to the source.
    pub fn start(&mut self) {
        self.source.request_authorization();
        self.source.activate();
        if self.state == TrackerState::Idle {
            self.state = TrackerState::Tracking;
            self.logger.record("tracking started");
            self.publish();
        }
    }

    /// Deactivates the source and discards everything recorded so far.
    pub fn stop(&mut self) {
        self.source.deactivate();
        self.state = TrackerState::Idle;
        self.clear();
        self.logger.record("tracking stopped, buffers cleared");
        self.publish();
    }

    /// Empties both buffers without touching the source or the state.
    pub fn reset(&mut self) {
        self.clear();
        self.logger.record("buffers reset");
        self.publish();
    }

    /// Single entry point for fix batches from the source.
    ///
    /// Returns how many fixes of the batch passed the filter. Batches that
    /// arrive while idle are dropped.
    pub fn ingest(&mut self, batch: &[Fix]) -> usize {
        if batch.is_empty() {
            return 0;
        }
        if self.state == TrackerState::Idle {
            self.logger
                .record(&format!("ignoring {} fixes while idle", batch.len()));
            return 0;
        }

        let now = self.clock.now();
        let mut accepted = 0;
        for fix in batch {
            let verdict = self.filter.classify(fix, now);
            self.metrics.record(verdict);
            match verdict {
                Verdict::Accepted => accepted += 1,
                Verdict::Rejected(reason) => self.logger.rejected(fix, reason),
            }
            self.debug.push(*fix, verdict);
        }

        let reference = self.reference_instant(now);
        let evicted = self.debug.prune(reference);
        self.track = TrackBuffer::derive(&self.debug, &self.config.track_window, reference);
        self.logger
            .batch(batch.len(), accepted, evicted, self.track.len());

        self.publish();
        accepted
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn track_buffer(&self) -> &[Fix] {
        self.track.as_slice()
    }

    pub fn debug_buffer(&self) -> Vec<Fix> {
        self.debug.fixes()
    }

    pub fn debug_entries(&self) -> impl Iterator<Item = &LoggedFix> {
        self.debug.entries()
    }

    pub fn pace(&self) -> Option<f64> {
        self.pace.estimate(self.track.as_slice())
    }

    pub fn current_pace(&self) -> String {
        format_pace(self.pace())
    }

    pub fn total_distance(&self) -> Option<f64> {
        total_distance(self.track.as_slice())
    }

    pub fn current_distance(&self) -> String {
        format_distance(self.total_distance())
    }

    pub fn track_count(&self) -> usize {
        self.track.len()
    }

    pub fn last_fix(&self) -> Option<Fix> {
        self.track.last().copied()
    }

    pub fn counters(&self) -> IngestCounters {
        self.metrics.snapshot()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<TrackSnapshot> {
        self.publisher.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TrackSnapshot>> {
        self.publisher.subscribe()
    }

    // Fixes may be stamped a few seconds ahead of the local clock; anchoring on
    // the newest accepted one keeps the track span within its age limit.
    fn reference_instant(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.debug.newest_accepted() {
            Some(newest) if newest > now => newest,
            _ => now,
        }
    }

    fn clear(&mut self) {
        self.debug.clear();
        self.track.clear();
        self.metrics.reset();
    }

    fn publish(&mut self) {
        let pace = self.pace();
        let distance = self.total_distance();
        let snapshot = TrackSnapshot {
            state: self.state,
            pace_min_per_km: pace,
            pace: format_pace(pace),
            distance_m: distance,
            distance: format_distance(distance),
            track_count: self.track.len(),
            debug_count: self.debug.len(),
            last_fix: self.last_fix(),
            counters: self.metrics.snapshot(),
            track: self.track.as_slice().to_vec(),
            debug: self.debug.entries().copied().collect(),
        };
        self.publisher.send_replace(Arc::new(snapshot));
    }
}

fn empty_snapshot() -> TrackSnapshot {
    TrackSnapshot {
        state: TrackerState::Idle,
        pace_min_per_km: None,
        pace: format_pace(None),
        distance_m: None,
        distance: format_distance(None),
        track_count: 0,
        debug_count: 0,
        last_fix: None,
        counters: IngestCounters::default(),
        track: Vec::new(),
        debug: Vec::new(),
    }
}
