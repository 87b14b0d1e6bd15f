//! One-line human readable playback status

use std::fmt;

use crate::profile::{PlaybackProfile, RateModel};
use crate::state::PlaybackSnapshot;

/// Title-bar style summary of a snapshot
///
/// ```text
/// Frame: 3/120 - FPS: 36.0 [LOOP]
/// Frame: 1/9 - Frequency: 14.0 kHz [MUTED] [REVERSE] [BOOMERANG]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusLine {
    frame: u32,
    total_frames: u32,
    rate_model: RateModel,
    signed_rate: f64,
    paused: bool,
    muted: bool,
    loop_enabled: bool,
    boomerang: bool,
}

impl StatusLine {
    pub fn new(snapshot: &PlaybackSnapshot, profile: &PlaybackProfile) -> Self {
        Self {
            frame: snapshot.frame_index,
            total_frames: snapshot.total_frames,
            rate_model: profile.rate_model,
            signed_rate: snapshot.rate.signed(),
            paused: snapshot.paused,
            muted: snapshot.muted,
            loop_enabled: snapshot.loop_enabled,
            boomerang: snapshot.boomerang,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame: {}/{}", self.frame + 1, self.total_frames)?;
        match self.rate_model {
            RateModel::Multiplier { base_frame_rate } => {
                write!(f, " - FPS: {:.1}", base_frame_rate * self.signed_rate)?;
            }
            RateModel::Frequency { .. } => {
                let hz = self.signed_rate.abs();
                if hz >= 1000.0 {
                    write!(f, " - Frequency: {:.1} kHz", hz / 1000.0)?;
                } else {
                    write!(f, " - Frequency: {:.1} Hz", hz)?;
                }
            }
        }
        if self.paused {
            f.write_str(" [PAUSED]")?;
        }
        if self.muted {
            f.write_str(" [MUTED]")?;
        }
        if self.signed_rate < 0.0 && !self.paused {
            f.write_str(" [REVERSE]")?;
        }
        if self.loop_enabled {
            f.write_str(if self.boomerang { " [BOOMERANG]" } else { " [LOOP]" })?;
        }
        Ok(())
    }
}
