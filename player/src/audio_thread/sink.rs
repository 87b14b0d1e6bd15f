//! Where generated samples go: the cpal ring or a paced null sink

use std::time::Instant;

use ringbuf::HeapProd;
use ringbuf::traits::{Observer, Producer};

use super::metrics::RING_BUFFER_CAPACITY;

pub(super) enum SampleSink {
    /// Producer half of the ring drained by the cpal callback
    Ring(HeapProd<f32>),
    /// No device: samples are discarded at the nominal rate
    Null(NullSink),
}

impl SampleSink {
    pub fn vacant_len(&self) -> usize {
        match self {
            SampleSink::Ring(producer) => producer.vacant_len(),
            SampleSink::Null(null) => null.vacant_len_at(Instant::now()),
        }
    }

    pub fn fill_level(&self) -> usize {
        RING_BUFFER_CAPACITY.saturating_sub(self.vacant_len())
    }

    /// Push as many samples as fit; returns how many were accepted
    pub fn push_slice(&mut self, samples: &[f32]) -> usize {
        match self {
            SampleSink::Ring(producer) => producer.push_slice(samples),
            SampleSink::Null(null) => null.push_at(samples.len(), Instant::now()),
        }
    }
}

/// Stand-in for an audio device that consumes interleaved stereo samples in
/// real time
#[derive(Debug, Clone)]
pub(super) struct NullSink {
    started: Instant,
    samples_per_sec: f64,
    pushed: u64,
}

impl NullSink {
    pub fn new(sample_rate: u32, now: Instant) -> Self {
        Self {
            started: now,
            samples_per_sec: sample_rate as f64 * 2.0,
            pushed: 0,
        }
    }

    fn consumed_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        (elapsed * self.samples_per_sec) as u64
    }

    fn fill_at(&self, now: Instant) -> usize {
        let fill = self.pushed.saturating_sub(self.consumed_at(now));
        fill.min(RING_BUFFER_CAPACITY as u64) as usize
    }

    pub fn vacant_len_at(&self, now: Instant) -> usize {
        RING_BUFFER_CAPACITY - self.fill_at(now)
    }

    pub fn push_at(&mut self, count: usize, now: Instant) -> usize {
        // A stalled generator must not be owed a burst of samples
        let consumed = self.consumed_at(now);
        if self.pushed < consumed {
            self.pushed = consumed;
        }
        let accepted = count.min(self.vacant_len_at(now));
        self.pushed += accepted as u64;
        accepted
    }
}
