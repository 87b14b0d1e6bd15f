//! Generation thread health counters

use std::time::{Duration, Instant};

use tracing::debug;

/// Ring capacity in samples: ~150ms of stereo at 44.1kHz
pub(super) const RING_BUFFER_CAPACITY: usize = 13230;
/// Samples rendered per block (512 stereo frames)
pub(super) const BLOCK_SAMPLES: usize = 1024;
/// Needing a block while the sink holds less than this counts as an underrun
pub(super) const LOW_BUFFER_THRESHOLD: usize = 4600;

const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Per-interval event counts, reset after each log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Counters {
    blocks: u64,
    samples: u64,
    commands: u64,
    crossings: u64,
    underruns: u64,
    overruns: u64,
}

#[derive(Debug, Clone, Copy)]
struct FillRange {
    current: usize,
    min: usize,
    max: usize,
}

impl FillRange {
    fn reset_to_current(&mut self) {
        self.min = self.current;
        self.max = self.current;
    }
}

#[derive(Debug, Clone)]
pub(super) struct AudioMetrics {
    counters: Counters,
    fill: FillRange,
    /// Exponential moving average of the block render time
    avg_block_us: f64,
    window_start: Instant,
}

impl AudioMetrics {
    pub fn new() -> Self {
        Self {
            counters: Counters::default(),
            fill: FillRange {
                current: 0,
                min: RING_BUFFER_CAPACITY,
                max: 0,
            },
            avg_block_us: 0.0,
            window_start: Instant::now(),
        }
    }

    /// Record the sink level seen before deciding whether to render
    pub fn observe_fill(&mut self, fill: usize) {
        self.fill.current = fill;
        self.fill.min = self.fill.min.min(fill);
        self.fill.max = self.fill.max.max(fill);
    }

    pub fn command_applied(&mut self) {
        self.counters.commands += 1;
    }

    /// Loop bound crossings resolved while rendering one block
    pub fn loop_crossings(&mut self, count: u32) {
        self.counters.crossings += u64::from(count);
    }

    /// A block is about to be rendered; flags an underrun if the sink ran low
    pub fn block_needed(&mut self) {
        if self.fill.current < LOW_BUFFER_THRESHOLD {
            self.counters.underruns += 1;
        }
    }

    /// A block of `rendered` samples took `elapsed`; the sink took `pushed`
    pub fn block_written(&mut self, rendered: usize, pushed: usize, elapsed: Duration) {
        let us = elapsed.as_secs_f64() * 1e6;
        self.avg_block_us = 0.1 * us + 0.9 * self.avg_block_us;
        self.counters.blocks += 1;
        self.counters.samples += pushed as u64;
        if pushed < rendered {
            self.counters.overruns += 1;
        }
    }

    /// Emit one debug line per interval, then start a new interval
    pub fn maybe_log(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) < LOG_INTERVAL {
            return;
        }
        let pct = |fill: usize| fill as f64 * 100.0 / RING_BUFFER_CAPACITY as f64;
        let c = self.counters;
        debug!(
            "Audio: buf={:.1}% ({:.1}%..{:.1}%), blocks={}, samples={}, commands={}, \
             crossings={}, underruns={}, overruns={}, avg_block={:.2}us",
            pct(self.fill.current),
            pct(self.fill.min),
            pct(self.fill.max),
            c.blocks,
            c.samples,
            c.commands,
            c.crossings,
            c.underruns,
            c.overruns,
            self.avg_block_us
        );
        self.counters = Counters::default();
        self.fill.reset_to_current();
        self.window_start = now;
    }
}
