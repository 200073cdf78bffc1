use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How the filter treats the speed reported alongside a fix.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPolicy {
    /// Reject fixes whose reported speed is negative (unavailable).
    #[default]
    RequireValid,
    /// Inverted compatibility mode: accept only fixes reporting a negative speed.
    LegacyNegativeOnly,
}

/// Quality thresholds applied to every incoming fix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub max_horizontal_accuracy_m: f64,
    pub max_future_skew_s: f64,
    pub speed_policy: SpeedPolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_horizontal_accuracy_m: 50.0,
            max_future_skew_s: 5.0,
            speed_policy: SpeedPolicy::RequireValid,
        }
    }
}

/// Longest buffer age a config may ask for (one year).
pub const MAX_WINDOW_AGE_S: f64 = 365.0 * 24.0 * 3600.0;

/// Age and count limits for a rolling buffer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    pub max_age_s: f64,
    pub max_count: usize,
}

impl WindowConfig {
    pub fn new(max_age_s: f64, max_count: usize) -> Self {
        Self {
            max_age_s,
            max_count,
        }
    }

    pub fn max_age(&self) -> Duration {
        seconds_to_duration(self.max_age_s)
    }
}

/// Shared configuration for the whole intake pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub filter: FilterConfig,
    pub debug_window: WindowConfig,
    pub track_window: WindowConfig,
    pub pace_window_s: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            debug_window: WindowConfig::new(200.0, 200),
            track_window: WindowConfig::new(30.0, 200),
            pace_window_s: 12.0,
        }
    }
}

impl TrackerConfig {
    /// Checks that every limit is usable before a tracker is built from it.
    pub fn validate(&self) -> PipelineResult<()> {
        for (name, window) in [
            ("debug_window", &self.debug_window),
            ("track_window", &self.track_window),
        ] {
            if window.max_count == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name}.max_count must be at least 1"
                )));
            }
            if !window.max_age_s.is_finite()
                || window.max_age_s <= 0.0
                || window.max_age_s > MAX_WINDOW_AGE_S
            {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name}.max_age_s must be between 0 and {MAX_WINDOW_AGE_S} seconds"
                )));
            }
        }

        if !self.pace_window_s.is_finite() || self.pace_window_s <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "pace_window_s must be a positive number of seconds".into(),
            ));
        }

        let filter = &self.filter;
        if !filter.max_horizontal_accuracy_m.is_finite() || filter.max_horizontal_accuracy_m < 0.0
        {
            return Err(PipelineError::InvalidConfig(
                "filter.max_horizontal_accuracy_m must be non-negative".into(),
            ));
        }
        if !filter.max_future_skew_s.is_finite() || filter.max_future_skew_s < 0.0 {
            return Err(PipelineError::InvalidConfig(
                "filter.max_future_skew_s must be non-negative".into(),
            ));
        }

        Ok(())
    }
}

/// Common error type for the pipeline's fallible edges.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("malformed fix batch: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Converts fractional seconds into a millisecond-resolution duration.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// Signed number of seconds from `earlier` to `later`.
pub fn seconds_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    let delta = later - earlier;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}
