//! Render progress reporting.

use std::time::{Duration, Instant};

/// Logs scanlines remaining with elapsed and estimated remaining time.
#[derive(Debug)]
pub struct Progress {
    total: usize,
    start: Instant,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            start: Instant::now(),
        }
    }

    /// Record that `remaining` units are still outstanding.
    pub fn report(&self, remaining: usize) {
        let elapsed = self.start.elapsed();
        let eta = estimate_remaining(elapsed, self.total - remaining.min(self.total), remaining);
        log::info!(
            "Scanlines remaining: {} / {} (elapsed {}, eta {})",
            remaining,
            self.total,
            format_hms(elapsed),
            eta.map_or_else(|| "--:--:--".to_string(), format_hms),
        );
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Extrapolate the time left from the average time per finished unit.
fn estimate_remaining(elapsed: Duration, done: usize, remaining: usize) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    Some(elapsed.mul_f64(remaining as f64 / done as f64))
}

/// Format a duration as `hh:mm:ss`, rounding down to whole seconds.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
