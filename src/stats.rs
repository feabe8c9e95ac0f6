use std::time::{Duration, Instant};

/// Running throughput figures for one sampling session.
///
/// Every method takes the current instant explicitly so the maths can be
/// checked without a clock.
#[derive(Debug, Clone)]
pub struct SpeedStats {
    chunk_kb: u64,
    chunks_read: u64,
    start: Instant,
    prev: Instant,
    avg_kbs: f64,
    peak_kbs: f64,
}

impl SpeedStats {
    pub fn new(chunk_kb: u64, now: Instant) -> Self {
        Self {
            chunk_kb,
            chunks_read: 0,
            start: now,
            prev: now,
            avg_kbs: 0.0,
            peak_kbs: 0.0,
        }
    }

    /// Counts one more chunk at `now` and returns the instantaneous rate in KB/s.
    ///
    /// A zero-length interval leaves the affected rate untouched.
    pub fn record(&mut self, now: Instant) -> f64 {
        self.chunks_read += 1;

        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        if elapsed > 0.0 {
            self.avg_kbs = self.total_kb() as f64 / elapsed;
        }

        let interval = now.saturating_duration_since(self.prev).as_secs_f64();
        let current = if interval > 0.0 {
            self.chunk_kb as f64 / interval
        } else {
            0.0
        };
        if current > self.peak_kbs {
            self.peak_kbs = current;
        }

        self.prev = now;
        current
    }

    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    pub fn total_kb(&self) -> u64 {
        self.chunks_read.saturating_mul(self.chunk_kb)
    }

    pub fn avg_kbs(&self) -> f64 {
        self.avg_kbs
    }

    pub fn peak_kbs(&self) -> f64 {
        self.peak_kbs
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn total_is_chunks_times_size() {
        let start = Instant::now();
        let mut stats = SpeedStats::new(50, start);
        for i in 1..=7 {
            stats.record(at(start, i * 10));
        }
        assert_eq!(stats.chunks_read(), 7);
        assert_eq!(stats.total_kb(), 350);
    }

    #[test]
    fn average_is_total_over_elapsed() {
        let start = Instant::now();
        let mut stats = SpeedStats::new(25, start);
        stats.record(at(start, 100));
        stats.record(at(start, 400));
        stats.record(at(start, 500));

        let expected = (3 * 25) as f64 / 0.5;
        assert!((stats.avg_kbs() - expected).abs() < 1e-9);
    }

    #[test]
    fn peak_never_drops_below_any_sample() {
        let start = Instant::now();
        let mut stats = SpeedStats::new(10, start);
        let offsets = [100, 150, 400, 410, 900, 1000];
        let mut seen = Vec::new();
        for ms in offsets {
            seen.push(stats.record(at(start, ms)));
            assert!(seen.iter().all(|&r| stats.peak_kbs() >= r));
        }
        // 10 KB over 10 ms was the fastest gap
        assert!((stats.peak_kbs() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_interval_keeps_previous_rates() {
        let start = Instant::now();
        let mut stats = SpeedStats::new(10, start);
        let instant = stats.record(start);
        assert_eq!(instant, 0.0);
        assert_eq!(stats.avg_kbs(), 0.0);
        assert_eq!(stats.peak_kbs(), 0.0);
        assert_eq!(stats.chunks_read(), 1);
    }
}
