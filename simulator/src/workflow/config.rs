use anyhow::Context;
use pacecore::prelude::SpeedPolicy;
use pacecore::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub tracker: TrackerConfig,
    pub generator: GeneratorConfig,
    /// Fixes handed to the tracker per delivery.
    pub batch_size: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            generator: GeneratorConfig::default(),
            batch_size: 1,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .tracker
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(fix_count: usize, speed_mps: f64, legacy_speed: bool) -> Self {
        let mut config = Self::default();
        config.generator.fix_count = fix_count;
        config.generator.speed_mps = speed_mps;
        if legacy_speed {
            config.tracker.filter.speed_policy = SpeedPolicy::LegacyNegativeOnly;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_overrides_generator() {
        let cfg = WorkflowConfig::from_args(90, 4.0, true);
        assert_eq!(cfg.generator.fix_count, 90);
        assert_eq!(cfg.generator.speed_mps, 4.0);
        assert_eq!(
            cfg.tracker.filter.speed_policy,
            SpeedPolicy::LegacyNegativeOnly
        );
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"batch_size: 3\ntracker:\n  pace_window_s: 15\n  filter:\n    speed_policy: legacy_negative_only\ngenerator:\n  fix_count: 120\n  speed_mps: 4.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.batch_size, 3);
        assert_eq!(cfg.tracker.pace_window_s, 15.0);
        assert_eq!(cfg.tracker.track_window.max_count, 200);
        assert_eq!(
            cfg.tracker.filter.speed_policy,
            SpeedPolicy::LegacyNegativeOnly
        );
        assert_eq!(cfg.tracker.filter.max_horizontal_accuracy_m, 50.0);
        assert_eq!(cfg.generator.fix_count, 120);
    }

    #[test]
    fn config_load_rejects_invalid_limits() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"tracker:\n  track_window:\n    max_age_s: 30\n    max_count: 0\n")
            .unwrap();
        let path = temp.into_temp_path();
        let err = WorkflowConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_count"));
    }
}
