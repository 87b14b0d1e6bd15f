//! Player main loop
//!
//! Routes control events to the audio thread and drives the render ticker
//! from the published snapshots. Runs on the calling thread.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, error, info, warn};
use waterfall_core::{ByteBuffer, PlaybackProfile, PlaybackSnapshot};

use crate::audio_thread::ThreadedAudioOutput;
use crate::capture::FrameCapture;
use crate::input::ControlEvent;
use crate::render::{FrameTicker, StatusReporter};

/// Why the main loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    InputClosed,
    AudioStopped,
}

pub struct App {
    audio: ThreadedAudioOutput,
    buffer: Arc<ByteBuffer>,
    profile: PlaybackProfile,
    ticker: FrameTicker,
    status: StatusReporter,
    capture: Option<FrameCapture>,
    frames_rendered: u64,
}

impl App {
    pub fn new(
        audio: ThreadedAudioOutput,
        buffer: Arc<ByteBuffer>,
        profile: PlaybackProfile,
        fps_cap: f64,
        capture: Option<FrameCapture>,
    ) -> Self {
        Self {
            audio,
            buffer,
            profile,
            ticker: FrameTicker::new(fps_cap, Instant::now()),
            status: StatusReporter::default(),
            capture,
            frames_rendered: 0,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.audio.snapshot()
    }

    pub fn audio(&self) -> &ThreadedAudioOutput {
        &self.audio
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Run until quit, input EOF or the audio thread dies
    pub fn run(&mut self, events: &Receiver<ControlEvent>) -> ExitReason {
        info!(
            "Playing {} frames of {}x{} ({})",
            self.buffer.total_frames(),
            self.profile.frame_width,
            self.profile.frame_height,
            self.profile.name
        );
        self.render_tick();

        let reason = loop {
            let timeout = self.ticker.time_until_next(Instant::now());
            match events.recv_timeout(timeout) {
                Ok(ControlEvent::Quit) => break ExitReason::Quit,
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break ExitReason::InputClosed,
            }

            if self.ticker.tick(Instant::now()) {
                if !self.audio.is_alive() {
                    error!("Audio generation thread stopped unexpectedly");
                    break ExitReason::AudioStopped;
                }
                self.render_tick();
            }
        };

        debug!(
            "Main loop exited ({:?}) after {} frames",
            reason, self.frames_rendered
        );
        reason
    }

    /// Apply one non-quit event
    pub fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Command(command) => {
                self.audio.send(command);
            }
            ControlEvent::Capture => {
                if let Err(e) = self.capture_frame() {
                    warn!("Frame capture failed: {:#}", e);
                }
            }
            ControlEvent::Quit => {}
        }
    }

    fn render_tick(&mut self) {
        let snapshot = self.audio.snapshot();
        self.status.update(&snapshot, &self.profile);
        self.frames_rendered += 1;
    }

    fn capture_frame(&mut self) -> Result<()> {
        let Some(capture) = self.capture.as_mut() else {
            warn!("No capture directory configured; ignoring capture");
            return Ok(());
        };
        let snapshot = self.audio.snapshot();
        capture.capture(&self.buffer, &snapshot, &self.profile)?;
        Ok(())
    }
}
