use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fix_interface::Fix;
use crate::prelude::{seconds_between, FilterConfig, SpeedPolicy};

/// Why a fix was kept out of the track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NonFiniteCoordinates,
    InvalidAccuracy,
    PoorAccuracy,
    FutureTimestamp,
    InvalidSpeed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Stateless quality gate deciding which fixes may feed pace and distance.
#[derive(Debug, Clone, Default)]
pub struct FixFilter {
    config: FilterConfig,
}

impl FixFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn accept(&self, fix: &Fix, now: DateTime<Utc>) -> bool {
        self.classify(fix, now).is_accepted()
    }

    /// Runs every check against `fix`; the first failing one decides the reason.
    pub fn classify(&self, fix: &Fix, now: DateTime<Utc>) -> Verdict {
        if !fix.latitude.is_finite()
            || !fix.longitude.is_finite()
            || !(-90.0..=90.0).contains(&fix.latitude)
            || !(-180.0..=180.0).contains(&fix.longitude)
        {
            return Verdict::Rejected(RejectReason::NonFiniteCoordinates);
        }

        // NaN accuracy fails both comparisons, so it is caught explicitly.
        if fix.horizontal_accuracy < 0.0 || fix.horizontal_accuracy.is_nan() {
            return Verdict::Rejected(RejectReason::InvalidAccuracy);
        }
        if fix.horizontal_accuracy > self.config.max_horizontal_accuracy_m {
            return Verdict::Rejected(RejectReason::PoorAccuracy);
        }

        if seconds_between(fix.timestamp, now) > self.config.max_future_skew_s {
            return Verdict::Rejected(RejectReason::FutureTimestamp);
        }

        let speed_ok = match self.config.speed_policy {
            SpeedPolicy::RequireValid => fix.speed >= 0.0,
            SpeedPolicy::LegacyNegativeOnly => fix.speed < 0.0,
        };
        if !speed_ok {
            return Verdict::Rejected(RejectReason::InvalidSpeed);
        }

        Verdict::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fix_at(now: DateTime<Utc>) -> Fix {
        Fix::new(52.37, 4.89, 1.0, 8.0, 3.2, now)
    }

    #[test]
    fn good_fix_is_accepted() {
        let now = Utc::now();
        let filter = FixFilter::default();
        assert_eq!(filter.classify(&fix_at(now), now), Verdict::Accepted);
    }

    #[test]
    fn accuracy_above_limit_always_rejected() {
        let now = Utc::now();
        let filter = FixFilter::default();
        for speed in [-1.0, 0.0, 4.0] {
            for offset in [-10, 0, 3] {
                let fix = Fix {
                    horizontal_accuracy: 50.01,
                    speed,
                    timestamp: now + Duration::seconds(offset),
                    ..fix_at(now)
                };
                assert!(!filter.accept(&fix, now));
            }
        }

        let legacy = FixFilter::new(FilterConfig {
            speed_policy: SpeedPolicy::LegacyNegativeOnly,
            ..Default::default()
        });
        let fix = Fix {
            horizontal_accuracy: 120.0,
            speed: -1.0,
            ..fix_at(now)
        };
        assert!(!legacy.accept(&fix, now));
    }

    #[test]
    fn accuracy_boundary_is_inclusive() {
        let now = Utc::now();
        let fix = Fix {
            horizontal_accuracy: 50.0,
            ..fix_at(now)
        };
        assert!(FixFilter::default().accept(&fix, now));
    }

    #[test]
    fn negative_accuracy_is_invalid() {
        let now = Utc::now();
        let fix = Fix {
            horizontal_accuracy: -1.0,
            ..fix_at(now)
        };
        assert_eq!(
            FixFilter::default().classify(&fix, now),
            Verdict::Rejected(RejectReason::InvalidAccuracy)
        );
    }

    #[test]
    fn future_timestamp_beyond_skew_is_rejected() {
        let now = Utc::now();
        let filter = FixFilter::default();
        let slightly_ahead = Fix {
            timestamp: now + Duration::seconds(5),
            ..fix_at(now)
        };
        let far_ahead = Fix {
            timestamp: now + Duration::milliseconds(5_001),
            ..fix_at(now)
        };
        assert!(filter.accept(&slightly_ahead, now));
        assert_eq!(
            filter.classify(&far_ahead, now),
            Verdict::Rejected(RejectReason::FutureTimestamp)
        );
    }

    #[test]
    fn default_policy_rejects_unavailable_speed() {
        let now = Utc::now();
        let filter = FixFilter::default();
        let unavailable = Fix {
            speed: -1.0,
            ..fix_at(now)
        };
        let standing = Fix {
            speed: 0.0,
            ..fix_at(now)
        };
        assert_eq!(
            filter.classify(&unavailable, now),
            Verdict::Rejected(RejectReason::InvalidSpeed)
        );
        assert!(filter.accept(&standing, now));
    }

    #[test]
    fn legacy_policy_keeps_only_negative_speed() {
        // Compatibility mode: every valid speed is skipped.
        let now = Utc::now();
        let filter = FixFilter::new(FilterConfig {
            speed_policy: SpeedPolicy::LegacyNegativeOnly,
            ..Default::default()
        });
        let moving = fix_at(now);
        let unavailable = Fix {
            speed: -1.0,
            ..fix_at(now)
        };
        assert_eq!(
            filter.classify(&moving, now),
            Verdict::Rejected(RejectReason::InvalidSpeed)
        );
        assert!(filter.accept(&unavailable, now));
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        let now = Utc::now();
        let filter = FixFilter::default();
        let nan = Fix {
            latitude: f64::NAN,
            ..fix_at(now)
        };
        let out_of_range = Fix {
            longitude: 181.0,
            ..fix_at(now)
        };
        let nan_accuracy = Fix {
            horizontal_accuracy: f64::NAN,
            ..fix_at(now)
        };
        assert_eq!(
            filter.classify(&nan, now),
            Verdict::Rejected(RejectReason::NonFiniteCoordinates)
        );
        assert!(!filter.accept(&out_of_range, now));
        assert_eq!(
            filter.classify(&nan_accuracy, now),
            Verdict::Rejected(RejectReason::InvalidAccuracy)
        );
    }
}
