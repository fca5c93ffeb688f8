//! Yield pacing for the cooperative driver and progress throttling.

use std::time::{Duration, Instant};

/// Granularity of progress reports: one callback per `total / 10_000`
/// produced blocks. Small fills round the stride up to every block.
const PROGRESS_STEPS: u64 = 10_000;

/// Decides when the cooperative driver hands control back to the host
/// scheduler. The clock baseline advances only on `rearm`, so a long
/// compress chain that overshoots the budget yields at the next block
/// boundary.
#[derive(Debug)]
pub(crate) struct YieldPacer {
    tick: Duration,
    armed_at: Instant,
}

impl YieldPacer {
    pub(crate) fn new(tick: Duration) -> Self {
        Self {
            tick,
            armed_at: Instant::now(),
        }
    }

    /// True once the elapsed time since the last yield leaves `[0, tick)`.
    pub(crate) fn due(&self) -> bool {
        self.armed_at.elapsed() >= self.tick
    }

    pub(crate) fn rearm(&mut self) {
        self.armed_at = Instant::now();
    }
}

/// Counts produced blocks and forwards throttled fractions to an optional
/// sink. The final report is exactly `1.0` and is issued once, from
/// `finish`.
pub(crate) struct ProgressMeter<'a> {
    sink: Option<&'a mut dyn FnMut(f64)>,
    total: u64,
    produced: u64,
    stride: u64,
}

impl<'a> ProgressMeter<'a> {
    pub(crate) fn new(total: u64, sink: Option<&'a mut dyn FnMut(f64)>) -> Self {
        Self {
            sink,
            total: total.max(1),
            produced: 0,
            stride: total.div_ceil(PROGRESS_STEPS).max(1),
        }
    }

    #[inline]
    pub(crate) fn record(&mut self) {
        self.produced += 1;
        if self.produced < self.total && self.produced % self.stride == 0 {
            if let Some(sink) = self.sink.as_mut() {
                sink(self.produced as f64 / self.total as f64);
            }
        }
    }

    pub(crate) fn finish(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tick_is_always_due() {
        let pacer = YieldPacer::new(Duration::ZERO);
        assert!(pacer.due());
    }

    #[test]
    fn rearm_resets_the_budget() {
        let mut pacer = YieldPacer::new(Duration::from_secs(3600));
        pacer.rearm();
        assert!(!pacer.due());
    }

    #[test]
    fn fractions_climb_and_end_at_one() {
        let mut seen = Vec::new();
        let mut sink = |fraction: f64| seen.push(fraction);
        let mut meter = ProgressMeter::new(100, Some(&mut sink));
        for _ in 0..100 {
            meter.record();
        }
        meter.finish();

        assert_eq!(seen.last().copied(), Some(1.0));
        assert_eq!(seen.iter().filter(|f| **f == 1.0).count(), 1);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen.iter().all(|f| (0.0..=1.0).contains(f)));
        // total=100 rounds the stride to every block: 99 partials + final.
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn large_totals_throttle_to_ten_thousand_reports() {
        let mut count = 0u32;
        let mut sink = |_: f64| count += 1;
        let mut meter = ProgressMeter::new(40_000, Some(&mut sink));
        for _ in 0..40_000 {
            meter.record();
        }
        meter.finish();
        // stride 4: 9999 partials plus the final 1.0.
        assert_eq!(count, 10_000);
    }

    #[test]
    fn no_sink_is_a_no_op() {
        let mut meter = ProgressMeter::new(10, None);
        for _ in 0..10 {
            meter.record();
        }
        meter.finish();
    }
}
