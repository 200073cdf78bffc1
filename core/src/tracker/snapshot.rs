use serde::Serialize;

use crate::fix_interface::Fix;
use crate::processing::rolling::LoggedFix;
use crate::telemetry::IngestCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    Idle,
    Tracking,
}

/// Immutable view of the tracker, published after every mutation.
///
/// The buffer copies are left out of the serialized form; exporters read them
/// directly.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSnapshot {
    pub state: TrackerState,
    pub pace_min_per_km: Option<f64>,
    pub pace: String,
    pub distance_m: Option<f64>,
    pub distance: String,
    pub track_count: usize,
    pub debug_count: usize,
    pub last_fix: Option<Fix>,
    pub counters: IngestCounters,
    #[serde(skip)]
    pub track: Vec<Fix>,
    #[serde(skip)]
    pub debug: Vec<LoggedFix>,
}
