use anyhow::{bail, Context};
use chrono::{DateTime, TimeZone, Utc};
use pacecore::math::geodesy::destination;
use pacecore::prelude::seconds_to_duration;
use pacecore::Fix;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::template::IntervalTemplate;

/// Configuration for generating a synthetic run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub fix_count: usize,
    pub interval_s: f64,
    pub speed_mps: f64,
    pub heading_deg: f64,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub position_noise_m: f64,
    pub accuracy_m: f64,
    /// Share of fixes corrupted the way real receivers misbehave.
    pub bad_fix_ratio: f64,
    pub seed: u64,
    pub start: Option<DateTime<Utc>>,
    pub intervals: Option<IntervalTemplate>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fix_count: 600,
            interval_s: 1.0,
            speed_mps: 3.0,
            heading_deg: 0.0,
            origin_lat: 52.3676,
            origin_lon: 4.9041,
            position_noise_m: 1.5,
            accuracy_m: 6.0,
            bad_fix_ratio: 0.05,
            seed: 0,
            start: None,
            intervals: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    fn speed_at(&self, elapsed_s: f64) -> f64 {
        match &self.intervals {
            Some(template) => template.speed_at(elapsed_s),
            None => self.speed_mps,
        }
    }
}

fn default_start() -> anyhow::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 10, 7, 8, 0, 0)
        .single()
        .context("building default run start")
}

fn corrupt(fix: &mut Fix, rng: &mut StdRng) {
    match rng.gen_range(0..3) {
        0 => fix.horizontal_accuracy = -1.0,
        1 => fix.horizontal_accuracy = rng.gen_range(65.0..250.0),
        _ => fix.speed = -1.0,
    }
}

/// Builds a deterministic run along a straight heading with seeded jitter.
pub fn build_run(config: &GeneratorConfig) -> anyhow::Result<Vec<Fix>> {
    if !config.interval_s.is_finite() || config.interval_s <= 0.0 {
        bail!("interval_s must be positive, got {}", config.interval_s);
    }

    let start = match config.start {
        Some(start) => start,
        None => default_start()?,
    };
    let mut rng = StdRng::seed_from_u64(config.seed);
    let bad_ratio = config.bad_fix_ratio.clamp(0.0, 1.0);
    let mut along_m = 0.0;
    let mut fixes = Vec::with_capacity(config.fix_count);

    for index in 0..config.fix_count {
        let elapsed_s = index as f64 * config.interval_s;
        let speed = config.speed_at(elapsed_s);
        if index > 0 {
            along_m += speed * config.interval_s;
        }

        let (mut lat, mut lon) = destination(
            config.origin_lat,
            config.origin_lon,
            config.heading_deg,
            along_m,
        );
        if config.position_noise_m > 0.0 {
            let bearing = rng.gen_range(0.0..360.0);
            let offset = rng.gen_range(0.0..config.position_noise_m);
            (lat, lon) = destination(lat, lon, bearing, offset);
        }

        let accuracy = (config.accuracy_m + rng.gen_range(-1.0..1.0)).max(0.0);
        let timestamp = start + seconds_to_duration(elapsed_s);
        let mut fix = Fix::new(lat, lon, 0.0, accuracy, speed, timestamp);
        if rng.gen_bool(bad_ratio) {
            corrupt(&mut fix, &mut rng);
        }
        fixes.push(fix);
    }

    Ok(fixes)
}
