//! Playback session: buffer, profile and state bound together
//!
//! A session is owned by exactly one execution context (the audio
//! generation thread). Other contexts talk to it through [`Command`]s and
//! read it through [`PlaybackSnapshot`]s.

use std::sync::Arc;

use tracing::{debug, info};

use crate::advance::{Crossing, PositionAdvancer, wrap};
use crate::buffer::ByteBuffer;
use crate::command::Command;
use crate::error::ProfileError;
use crate::frame::FrameIndexer;
use crate::profile::PlaybackProfile;
use crate::rate::RateController;
use crate::state::{PlaybackSnapshot, PlaybackState, Rate};
use crate::synth::SampleSynthesizer;

pub struct Session {
    buffer: Arc<ByteBuffer>,
    profile: PlaybackProfile,
    controller: RateController,
    advancer: PositionAdvancer,
    state: PlaybackState,
    sample_rate: u32,
}

impl Session {
    /// Start a session at the profile's initial rate over its default loop
    ///
    /// The default loop end is clamped to the last byte for files shorter
    /// than the default loop.
    pub fn new(
        buffer: Arc<ByteBuffer>,
        profile: PlaybackProfile,
        sample_rate: u32,
    ) -> Result<Self, ProfileError> {
        profile.validate()?;
        let controller = RateController::new(&profile);
        let advancer = PositionAdvancer::new(buffer.len(), profile.bytes_per_unit(sample_rate));

        let loop_bytes = profile.default_loop_frames as f64 * profile.frame_bytes() as f64;
        let last_byte = (buffer.len() - 1) as f64;
        let state = PlaybackState::new(
            Rate::forward(profile.initial_rate),
            0.0,
            loop_bytes.min(last_byte),
        );

        info!(
            "Session started: profile '{}', {}x{} frames, {} frames total, {} Hz",
            profile.name,
            profile.frame_width,
            profile.frame_height,
            buffer.total_frames(),
            sample_rate
        );

        Ok(Self {
            buffer,
            profile,
            controller,
            advancer,
            state,
            sample_rate,
        })
    }

    pub fn buffer(&self) -> &Arc<ByteBuffer> {
        &self.buffer
    }

    pub fn profile(&self) -> &PlaybackProfile {
        &self.profile
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PlaybackState {
        &mut self.state
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Rebuild the byte step for a new output rate (device renegotiation)
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        if sample_rate == self.sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        self.advancer = PositionAdvancer::new(
            self.buffer.len(),
            self.profile.bytes_per_unit(sample_rate),
        );
        debug!("Sample rate changed to {} Hz", sample_rate);
    }

    /// Apply one control command
    pub fn apply(&mut self, command: Command) {
        let controller = &self.controller;
        let state = &mut self.state;
        match command {
            Command::TogglePause => state.paused = !state.paused,
            Command::ToggleMute => state.muted = !state.muted,
            Command::IncreaseRate => controller.increase(state),
            Command::DecreaseRate => controller.decrease(state),
            Command::ReverseDirection => controller.reverse_direction(state),
            Command::ResetDefault => controller.reset_to_default(state),
            Command::ForcePositive => controller.force_positive(state),
            Command::ForceNegative => controller.force_negative(state),
            Command::JumpRateUp => controller.jump_up(state),
            Command::JumpRateDown => controller.jump_down(state),
            Command::Freeze => controller.freeze(state),
            Command::SeekRelative(delta) => self.seek(self.state.position + delta),
            Command::SeekAbsolute(position) => self.seek(position),
            Command::StepFrame(frames) => {
                let delta = frames as f64 * self.buffer.frame_bytes() as f64;
                self.seek(self.state.position + delta);
            }
            Command::SeekStart => self.seek(0.0),
            Command::SeekLastFrame => {
                let last = self.buffer.total_frames().saturating_sub(1) as f64;
                self.seek(last * self.buffer.frame_bytes() as f64);
            }
            Command::Restart => {
                state.position = 0.0;
                state.paused = false;
                controller.reset_to_default(state);
            }
            Command::ToggleLoop => state.loop_enabled = !state.loop_enabled,
            Command::ToggleBoomerang => state.boomerang = !state.boomerang,
            Command::SetLoopStartHere => {
                if state.loop_enabled {
                    debug!("Loop start ignored while looping is enabled");
                } else {
                    state.loop_start = state.position;
                }
            }
            Command::SetLoopEndHere => {
                if state.loop_enabled {
                    debug!("Loop end ignored while looping is enabled");
                } else {
                    state.loop_end = state.position;
                }
            }
            Command::SetLoop { start, end } => {
                state.loop_start = start;
                state.loop_end = end;
            }
            Command::AdjustVolume(delta) => state.adjust_volume(delta),
        }
        debug!(
            ?command,
            position = self.state.position,
            rate = self.state.rate.signed(),
            "Applied command"
        );
    }

    fn seek(&mut self, position: f64) {
        self.state.position = wrap(position, self.advancer.len());
    }

    /// Produce one mono sample
    ///
    /// Paused or muted, the cursor holds still and the output is silent.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.step().0
    }

    #[inline]
    fn step(&mut self) -> (f32, Option<Crossing>) {
        if self.state.paused || self.state.muted {
            return (0.0, None);
        }
        let crossing = self.advancer.advance(&mut self.state);
        (SampleSynthesizer::synthesize(&self.state, &self.buffer), crossing)
    }

    /// Fill an interleaved stereo block; the mono sample goes to both channels
    ///
    /// A trailing odd sample is written as silence. Returns how many loop
    /// bound crossings were resolved while rendering.
    pub fn render(&mut self, out: &mut [f32]) -> u32 {
        let mut crossings = 0;
        let mut frames = out.chunks_exact_mut(2);
        for frame in &mut frames {
            let (sample, crossing) = self.step();
            crossings += u32::from(crossing.is_some());
            frame[0] = sample;
            frame[1] = sample;
        }
        frames.into_remainder().fill(0.0);
        crossings
    }

    /// Frame currently under the cursor
    pub fn frame_index(&self) -> u32 {
        FrameIndexer::frame_index(self.state.position, &self.buffer)
    }

    pub fn frame_offset(&self) -> usize {
        FrameIndexer::frame_offset(self.state.position, &self.buffer)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let s = &self.state;
        PlaybackSnapshot {
            position: s.position,
            rate: s.rate,
            frame_index: self.frame_index(),
            frame_offset: self.frame_offset(),
            total_frames: self.buffer.total_frames(),
            loop_enabled: s.loop_enabled,
            boomerang: s.boomerang,
            loop_start: s.loop_start,
            loop_end: s.loop_end,
            paused: s.paused,
            muted: s.muted,
            volume: s.volume(),
        }
    }
}
