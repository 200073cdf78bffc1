//! Intake, filtering and pace-estimation core for live run tracking.
//!
//! Raw GPS fixes pass through a quality filter into a bounded debug log; the
//! track used for live metrics is re-derived from that log after every batch,
//! and pace and distance are computed on demand from the track.

pub mod fix_interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod tracker;

pub use fix_interface::{Clock, Fix, FixSource, ManualClock, PassiveSource, SystemClock};
pub use prelude::{PipelineError, PipelineResult, SpeedPolicy, TrackerConfig};
pub use tracker::{TrackSnapshot, Tracker, TrackerState};
