use crate::fix_interface::Fix;
use crate::prelude::seconds_between;
use crate::processing::distance::path_length;

pub const DEFAULT_PACE_WINDOW_S: f64 = 12.0;

const NO_PACE: &str = "--:-- /km";

/// Sub-microsecond residue from the haversine sums is not a real second.
const SECONDS_RESOLUTION: f64 = 1e6;

/// Smoothed pace over a short trailing window of the track.
#[derive(Debug, Clone, Copy)]
pub struct PaceEstimator {
    window_s: f64,
}

impl Default for PaceEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_PACE_WINDOW_S)
    }
}

impl PaceEstimator {
    pub fn new(window_s: f64) -> Self {
        Self { window_s }
    }

    pub fn estimate(&self, track: &[Fix]) -> Option<f64> {
        estimate(track, self.window_s)
    }
}

/// Minutes per kilometer over the fixes within `window_s` of the newest one.
///
/// `track` must be ascending by timestamp. Returns `None` with fewer than two
/// fixes in the window, or when the window covers no distance or no time.
pub fn estimate(track: &[Fix], window_s: f64) -> Option<f64> {
    let last = track.last()?;
    let start = track
        .iter()
        .position(|fix| seconds_between(last.timestamp, fix.timestamp) <= window_s)?;
    let window = &track[start..];
    if window.len() < 2 {
        return None;
    }

    let distance = path_length(window);
    let duration = seconds_between(window[window.len() - 1].timestamp, window[0].timestamp);
    if distance <= 0.0 || duration <= 0.0 {
        return None;
    }

    let seconds_per_km = duration / (distance / 1000.0);
    Some(seconds_per_km / 60.0)
}

/// Renders a pace as `MM:SS /km`, truncating seconds.
pub fn format_pace(pace_min_per_km: Option<f64>) -> String {
    match pace_min_per_km {
        Some(pace) if pace.is_finite() && pace >= 0.0 => {
            let total_s = ((pace * 60.0 * SECONDS_RESOLUTION).round() / SECONDS_RESOLUTION) as u64;
            format!("{:02}:{:02} /km", total_s / 60, total_s % 60)
        }
        _ => NO_PACE.to_string(),
    }
}
