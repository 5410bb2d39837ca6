//! Throttled telemetry
//!
//! Position is forwarded at most once per interval of wall-clock time,
//! duration once per distinct value. Which status reports arrive in between
//! does not matter; the throttle only looks at the clock.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct TelemetryThrottle {
    interval: Duration,
    last_position_emit: Option<Instant>,
    last_duration: Option<u64>,
}

impl TelemetryThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_position_emit: None,
            last_duration: None,
        }
    }

    /// Returns the position to forward, or `None` while throttled
    pub fn position(&mut self, position_ms: u64, now: Instant) -> Option<u64> {
        let due = match self.last_position_emit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_position_emit = Some(now);
            Some(position_ms)
        } else {
            None
        }
    }

    /// Returns the duration to forward when it differs from the last one
    pub fn duration(&mut self, duration_ms: u64) -> Option<u64> {
        if self.last_duration == Some(duration_ms) {
            return None;
        }
        self.last_duration = Some(duration_ms);
        Some(duration_ms)
    }

    /// A new media load reports its duration again; the position window
    /// keeps running across loads
    pub fn reload(&mut self) {
        self.last_duration = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_most_once_per_interval() {
        let t0 = Instant::now();
        let mut throttle = TelemetryThrottle::new(Duration::from_secs(1));

        // 10 s of reports every 100 ms
        let emitted: Vec<u64> = (0..=100u64)
            .filter_map(|i| throttle.position(i * 100, t0 + Duration::from_millis(i * 100)))
            .collect();

        assert_eq!(emitted.len(), 11);
        assert_eq!(emitted.first(), Some(&0));
        assert_eq!(emitted.last(), Some(&10_000));
    }

    #[test]
    fn test_burst_within_interval_emits_once() {
        let t0 = Instant::now();
        let mut throttle = TelemetryThrottle::new(Duration::from_secs(1));
        assert_eq!(throttle.position(0, t0), Some(0));
        for ms in 1..50 {
            assert_eq!(throttle.position(ms * 10, t0 + Duration::from_millis(ms * 10)), None);
        }
    }

    #[test]
    fn test_duration_once_per_distinct_value() {
        let mut throttle = TelemetryThrottle::new(Duration::from_secs(1));
        assert_eq!(throttle.duration(60_000), Some(60_000));
        assert_eq!(throttle.duration(60_000), None);
        assert_eq!(throttle.duration(61_500), Some(61_500));
        assert_eq!(throttle.duration(60_000), Some(60_000));
    }

    #[test]
    fn test_reload_keeps_position_window() {
        let t0 = Instant::now();
        let mut throttle = TelemetryThrottle::new(Duration::from_secs(1));
        throttle.position(0, t0);
        throttle.duration(5_000);
        throttle.reload();

        assert_eq!(throttle.position(10, t0 + Duration::from_millis(10)), None);
        assert_eq!(throttle.duration(5_000), Some(5_000));
        assert_eq!(throttle.position(1_000, t0 + Duration::from_secs(1)), Some(1_000));
    }
}
