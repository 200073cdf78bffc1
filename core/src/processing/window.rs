use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

use crate::fix_interface::Fix;

/// Anything that carries the instant it was observed at.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for Fix {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Evicts by age first, then trims the oldest surplus beyond `max_count`.
///
/// Entries exactly `max_age` old survive. An age reaching past the
/// representable range disables the age cutoff. The buffer is assumed to be
/// in insertion order, so the count trim removes a prefix.
pub fn prune<T: Timestamped>(
    buffer: &mut VecDeque<T>,
    now: DateTime<Utc>,
    max_age: Duration,
    max_count: usize,
) -> usize {
    let before = buffer.len();
    if let Some(cutoff) = now.checked_sub_signed(max_age) {
        buffer.retain(|entry| entry.timestamp() >= cutoff);
    }

    if buffer.len() > max_count {
        let surplus = buffer.len() - max_count;
        buffer.drain(..surplus);
    }

    before - buffer.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixes(base: DateTime<Utc>, count: i64) -> VecDeque<Fix> {
        (0..count)
            .map(|i| Fix::new(0.0, 0.0, 0.0, 5.0, 1.0, base + Duration::seconds(i)))
            .collect()
    }

    #[test]
    fn age_eviction_keeps_boundary_entry() {
        let base = Utc::now();
        let mut buffer = fixes(base, 41);
        let now = base + Duration::seconds(40);
        let removed = prune(&mut buffer, now, Duration::seconds(30), 200);
        assert_eq!(removed, 10);
        assert_eq!(buffer.front().map(|f| f.timestamp), Some(base + Duration::seconds(10)));
    }

    #[test]
    fn count_trim_removes_oldest() {
        let base = Utc::now();
        let mut buffer = fixes(base, 10);
        prune(&mut buffer, base + Duration::seconds(9), Duration::seconds(100), 4);
        let kept: Vec<_> = buffer.iter().map(|f| f.timestamp).collect();
        assert_eq!(kept, (6..10).map(|i| base + Duration::seconds(i)).collect::<Vec<_>>());
    }

    #[test]
    fn surviving_span_respects_limits() {
        let base = Utc::now();
        for (count, age, limit) in [(250, 30, 200), (50, 200, 20), (5, 1, 200)] {
            let mut buffer = fixes(base, count);
            let newest = base + Duration::seconds(count - 1);
            prune(&mut buffer, newest, Duration::seconds(age), limit);

            assert!(buffer.len() <= limit);
            let oldest = buffer.front().map(|f| f.timestamp).unwrap();
            let latest = buffer.back().map(|f| f.timestamp).unwrap();
            assert!(latest - oldest <= Duration::seconds(age));
        }
    }

    #[test]
    fn unrepresentable_age_only_trims_by_count() {
        let base = Utc::now();
        let mut buffer = fixes(base, 10);
        let removed = prune(&mut buffer, base, Duration::milliseconds(i64::MAX), 8);
        assert_eq!(removed, 2);
        assert_eq!(buffer.front().map(|f| f.timestamp), Some(base + Duration::seconds(2)));
    }

    #[test]
    fn prune_on_empty_buffer_is_noop() {
        let mut buffer: VecDeque<Fix> = VecDeque::new();
        assert_eq!(prune(&mut buffer, Utc::now(), Duration::seconds(30), 200), 0);
    }
}
