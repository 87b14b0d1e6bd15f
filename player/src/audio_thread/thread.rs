//! Audio generation thread
//!
//! Owns the session. Commands are drained and applied only between blocks,
//! so the advancer never sees a half-applied update.

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};
use waterfall_core::{Command, Session};

use super::handle::AudioGenHandle;
use super::metrics::{AudioMetrics, BLOCK_SAMPLES};
use super::sink::SampleSink;
use super::snapshot::SharedSnapshot;

/// Commands queued before `send` starts dropping
const COMMAND_QUEUE_DEPTH: usize = 64;

/// How long to sleep when the sink has no room
const IDLE_WAIT: Duration = Duration::from_millis(1);

pub(super) struct AudioGenThread {
    rx: mpsc::Receiver<Command>,

    sink: SampleSink,

    /// Notified by the cpal callback after it drains the ring
    condvar: Arc<(Mutex<bool>, Condvar)>,

    output_buffer: Vec<f32>,

    session: Session,

    snapshot: SharedSnapshot,

    metrics: AudioMetrics,
}

impl AudioGenThread {
    /// Spawn the generation thread
    ///
    /// `condvar` is the one the sink's consumer notifies; a null sink may
    /// pass a fresh one nobody notifies.
    pub fn spawn(
        sink: SampleSink,
        session: Session,
        condvar: Arc<(Mutex<bool>, Condvar)>,
    ) -> AudioGenHandle {
        let (tx, rx) = mpsc::sync_channel::<Command>(COMMAND_QUEUE_DEPTH);
        let snapshot = SharedSnapshot::new(session.snapshot());
        let shared = snapshot.clone();

        let handle = thread::Builder::new()
            .name("audio-gen".into())
            .spawn(move || {
                let mut audio_gen = Self {
                    rx,
                    sink,
                    condvar,
                    output_buffer: vec![0.0; BLOCK_SAMPLES],
                    session,
                    snapshot: shared,
                    metrics: AudioMetrics::new(),
                };
                audio_gen.run();
            })
            .expect("failed to spawn audio generation thread");

        AudioGenHandle {
            tx: Some(tx),
            handle: Some(handle),
            snapshot,
        }
    }

    fn run(&mut self) {
        debug!("Audio generation thread started");

        loop {
            if !self.drain_commands() {
                debug!("Audio generation thread exiting (channel disconnected)");
                break;
            }

            self.metrics.observe_fill(self.sink.fill_level());

            if self.sink.vacant_len() >= BLOCK_SAMPLES {
                self.metrics.block_needed();
                self.generate_block();
                self.snapshot.publish(self.session.snapshot());
                // Keep filling until the sink is topped up
                continue;
            }

            let (lock, cvar) = &*self.condvar;
            let guard = lock.lock().unwrap_or_else(|e| {
                warn!("Audio thread condvar mutex poisoned; continuing");
                e.into_inner()
            });
            let _ = cvar.wait_timeout(guard, IDLE_WAIT).unwrap_or_else(|e| {
                warn!("Audio thread condvar wait mutex poisoned; continuing");
                e.into_inner()
            });

            self.metrics.maybe_log(Instant::now());
        }

        self.snapshot.publish(self.session.snapshot());
        debug!("Audio generation thread finished");
    }

    /// Apply every queued command; `false` once the sender is gone
    fn drain_commands(&mut self) -> bool {
        let mut applied = false;
        let connected = loop {
            match self.rx.try_recv() {
                Ok(command) => {
                    self.session.apply(command);
                    self.metrics.command_applied();
                    applied = true;
                }
                Err(mpsc::TryRecvError::Empty) => break true,
                Err(mpsc::TryRecvError::Disconnected) => break false,
            }
        };
        if applied {
            self.snapshot.publish(self.session.snapshot());
        }
        connected
    }

    fn generate_block(&mut self) {
        let start = Instant::now();
        let crossings = self.session.render(&mut self.output_buffer);
        let elapsed = start.elapsed();
        self.metrics.loop_crossings(crossings);

        let pushed = self.sink.push_slice(&self.output_buffer);
        if pushed < self.output_buffer.len() {
            trace!(
                "Audio sink full: dropped {} samples",
                self.output_buffer.len() - pushed
            );
        }
        self.metrics
            .block_written(self.output_buffer.len(), pushed, elapsed);
    }
}
