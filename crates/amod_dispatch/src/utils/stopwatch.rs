use std::time::Instant;

use jiff::SignedDuration;
use tracing::debug;

/// Wall-clock time spent in one stage of a tick.
pub struct Stopwatch<'a> {
    stage: &'a str,
    start_time: Instant,
}

impl<'a> Stopwatch<'a> {
    pub fn start(stage: &'a str) -> Self {
        Stopwatch {
            stage,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> SignedDuration {
        SignedDuration::try_from(self.start_time.elapsed()).unwrap_or(SignedDuration::MAX)
    }

    /// Logs the elapsed time at debug level and returns it.
    pub fn stop(self) -> SignedDuration {
        let elapsed = self.elapsed();
        debug!(stage = self.stage, %elapsed, "Stage finished");
        elapsed
    }
}
