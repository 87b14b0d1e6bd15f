//! Render context: fixed-cadence visual ticks
//!
//! The ticker never touches the session. Each tick reads the latest
//! snapshot, works out the frame under the cursor and reports status
//! changes.

use std::time::{Duration, Instant};

use tracing::info;
use waterfall_core::{PlaybackProfile, PlaybackSnapshot, StatusLine};

/// Lowest accepted refresh rate
const MIN_FPS: f64 = 1.0;
/// Highest accepted refresh rate
const MAX_FPS: f64 = 240.0;

/// Visual refresh clock capped at a frame rate
#[derive(Debug, Clone)]
pub struct FrameTicker {
    interval: Duration,
    next: Instant,
}

impl FrameTicker {
    pub fn new(fps_cap: f64, now: Instant) -> Self {
        let fps = if fps_cap.is_finite() {
            fps_cap.clamp(MIN_FPS, MAX_FPS)
        } else {
            MAX_FPS
        };
        let interval = Duration::from_secs_f64(1.0 / fps);
        Self {
            interval,
            next: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick is due
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Consume a due tick
    ///
    /// Missed ticks are skipped rather than replayed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}

/// Logs the status line whenever it changes
#[derive(Debug, Default)]
pub struct StatusReporter {
    last: Option<StatusLine>,
}

impl StatusReporter {
    /// Returns the new line when it differs from the last one reported
    pub fn update(
        &mut self,
        snapshot: &PlaybackSnapshot,
        profile: &PlaybackProfile,
    ) -> Option<StatusLine> {
        let line = StatusLine::new(snapshot, profile);
        if self.last == Some(line) {
            return None;
        }
        self.last = Some(line);
        info!("{}", line);
        Some(line)
    }
}
