use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::fix_interface::Fix;
use crate::prelude::WindowConfig;
use crate::processing::filter::Verdict;
use crate::processing::window::{prune, Timestamped};

/// A fix as it arrived, together with the filter's decision at arrival time.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct LoggedFix {
    pub fix: Fix,
    pub verdict: Verdict,
}

impl Timestamped for LoggedFix {
    fn timestamp(&self) -> DateTime<Utc> {
        self.fix.timestamp
    }
}

/// Bounded log of every fix received, accepted or not.
#[derive(Debug, Clone)]
pub struct DebugBuffer {
    entries: VecDeque<LoggedFix>,
    limits: WindowConfig,
}

impl DebugBuffer {
    pub fn with_limits(limits: WindowConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(limits.max_count.min(1024)),
            limits,
        }
    }

    pub fn push(&mut self, fix: Fix, verdict: Verdict) {
        self.entries.push_back(LoggedFix { fix, verdict });
    }

    /// Applies the age and count limits; returns how many entries were evicted.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        prune(
            &mut self.entries,
            now,
            self.limits.max_age(),
            self.limits.max_count,
        )
    }

    /// Timestamp of the newest fix that passed the filter.
    pub fn newest_accepted(&self) -> Option<DateTime<Utc>> {
        self.entries
            .iter()
            .filter(|entry| entry.verdict.is_accepted())
            .map(|entry| entry.fix.timestamp)
            .max()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LoggedFix> {
        self.entries.iter()
    }

    pub fn fixes(&self) -> Vec<Fix> {
        self.entries.iter().map(|entry| entry.fix).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Accepted fixes only, ascending by timestamp. Never maintained on its own:
/// it is rebuilt from the debug buffer after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackBuffer {
    fixes: Vec<Fix>,
}

impl TrackBuffer {
    pub fn derive(debug: &DebugBuffer, limits: &WindowConfig, now: DateTime<Utc>) -> Self {
        let mut accepted: Vec<Fix> = debug
            .entries()
            .filter(|entry| entry.verdict.is_accepted())
            .map(|entry| entry.fix)
            .collect();
        accepted.sort_by_key(|fix| fix.timestamp);

        let skip = accepted.len().saturating_sub(limits.max_count);
        let mut window: VecDeque<Fix> = accepted.into_iter().skip(skip).collect();
        prune(&mut window, now, limits.max_age(), limits.max_count);

        Self {
            fixes: window.into(),
        }
    }

    pub fn as_slice(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn last(&self) -> Option<&Fix> {
        self.fixes.last()
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn clear(&mut self) {
        self.fixes.clear();
    }
}
