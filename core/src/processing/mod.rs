pub mod distance;
pub mod filter;
pub mod pace;
pub mod rolling;
pub mod window;

pub use distance::{format_distance, total_distance};
pub use filter::{FixFilter, RejectReason, Verdict};
pub use pace::{estimate, format_pace, PaceEstimator};
pub use rolling::{DebugBuffer, LoggedFix, TrackBuffer};
pub use window::prune;
