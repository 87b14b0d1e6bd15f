//! Mutable session state shared by the audio, render and input contexts

use crate::MAX_VOLUME;

/// Playback direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// The opposite direction
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// `+1.0` or `-1.0`
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Signed playback rate split into direction and magnitude
///
/// Magnitude is in profile units (a multiplier or a frequency), never
/// negative. A zero magnitude freezes the cursor without pausing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rate {
    pub direction: Direction,
    pub magnitude: f64,
}

impl Rate {
    pub fn forward(magnitude: f64) -> Self {
        Self {
            direction: Direction::Forward,
            magnitude: magnitude.abs(),
        }
    }

    pub fn reverse(magnitude: f64) -> Self {
        Self {
            direction: Direction::Reverse,
            magnitude: magnitude.abs(),
        }
    }

    /// Build from a signed scalar; zero keeps `fallback` as the direction
    pub fn from_signed(value: f64, fallback: Direction) -> Self {
        let direction = if value > 0.0 {
            Direction::Forward
        } else if value < 0.0 {
            Direction::Reverse
        } else {
            fallback
        };
        Self {
            direction,
            magnitude: value.abs(),
        }
    }

    /// Signed scalar form (positive = forward)
    pub fn signed(&self) -> f64 {
        self.direction.sign() * self.magnitude
    }

    /// Bytes advanced per output sample
    #[inline]
    pub fn to_delta(&self, bytes_per_unit: f64) -> f64 {
        self.signed() * bytes_per_unit
    }

    /// Negate in place (boomerang reflection)
    #[inline]
    pub fn flip(&mut self) {
        self.direction = self.direction.flipped();
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == 0.0
    }
}

/// Session playback state
///
/// `position` is in bytes. Between advance steps it always lies in
/// `[0, len)` of the buffer it was resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Cursor into the byte buffer
    pub position: f64,
    /// Signed advance rate in profile units
    pub rate: Rate,
    /// Whether loop bounds are enforced
    pub loop_enabled: bool,
    /// Reflect at loop bounds instead of jumping
    pub boomerang: bool,
    /// Loop start in bytes
    pub loop_start: f64,
    /// Loop end in bytes (may be below `loop_start` for a wrapped region)
    pub loop_end: f64,
    /// Paused: no advancement, silence
    pub paused: bool,
    /// Muted: advancement continues, silence
    pub muted: bool,
    volume: f64,
}

impl PlaybackState {
    /// Initial state: looping `[loop_start, loop_end]`, cursor at loop start
    pub fn new(rate: Rate, loop_start: f64, loop_end: f64) -> Self {
        Self {
            position: loop_start,
            rate,
            loop_enabled: true,
            boomerang: false,
            loop_start,
            loop_end,
            paused: false,
            muted: false,
            volume: 1.0,
        }
    }

    /// Output gain in `[0, 2]`
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Set the gain, clamped to `[0, 2]`; NaN is ignored
    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }

    pub fn adjust_volume(&mut self, delta: f64) {
        self.set_volume(self.volume + delta);
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(Rate::forward(1.0), 0.0, 0.0)
    }
}

/// Read-only copy of the state published for the render context
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub position: f64,
    pub rate: Rate,
    pub frame_index: u32,
    pub frame_offset: usize,
    pub total_frames: u32,
    pub loop_enabled: bool,
    pub boomerang: bool,
    pub loop_start: f64,
    pub loop_end: f64,
    pub paused: bool,
    pub muted: bool,
    pub volume: f64,
}
