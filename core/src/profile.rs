//! Playback profiles
//!
//! One profile captures everything that differs between player variants:
//! frame geometry, how a rate value maps to bytes-per-sample, the rate-change
//! ladder, default loop length and palette. The state machine itself is
//! shared by all of them.

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::palette::Palette;

/// Visual frame rate at multiplier 1.0
pub const BASE_FRAME_RATE: f64 = 24.0;

/// Frequency that corresponds to one byte per output sample
pub const REFERENCE_FREQUENCY: f64 = 24.0;

/// Largest frequency magnitude reachable with the discrete model
pub const MAX_FREQUENCY: f64 = 1_000_000.0;

/// Default loop length in frames (frames 1 through 34)
pub const DEFAULT_LOOP_FRAMES: u32 = 34;

/// How a rate magnitude translates into buffer advancement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateModel {
    /// Continuous multiplier of the baseline visual frame rate
    ///
    /// `1.0` plays `base_frame_rate` frames per second of audio.
    Multiplier { base_frame_rate: f64 },
    /// Discrete integer frequency
    ///
    /// `reference_hz` advances exactly one byte per output sample.
    Frequency { reference_hz: f64, max_magnitude: f64 },
}

impl RateModel {
    /// Whether rate magnitudes are whole numbers
    pub fn is_discrete(&self) -> bool {
        matches!(self, RateModel::Frequency { .. })
    }
}

/// One threshold of the rate-change ladder
///
/// Magnitudes strictly below `below` change by `step` per command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderRung {
    pub below: f64,
    pub step: f64,
}

impl LadderRung {
    pub const fn new(below: f64, step: f64) -> Self {
        Self { below, step }
    }
}

/// Full configuration of one player variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackProfile {
    /// Preset name (for logging and the status line)
    pub name: String,
    /// Frame width in pixels (bytes)
    pub frame_width: u32,
    /// Frame height in pixels (rows)
    pub frame_height: u32,
    /// Rate interpretation
    pub rate_model: RateModel,
    /// Baseline unit: `ResetDefault` target and zero-substitute
    pub baseline: f64,
    /// Rate at session start (always forward)
    pub initial_rate: f64,
    /// Step ladder, sorted by threshold
    pub ladder: Vec<LadderRung>,
    /// Step used above the last ladder threshold
    pub top_step: f64,
    /// Default loop length in frames starting at byte 0
    pub default_loop_frames: u32,
    /// Byte to color mapping
    pub palette: Palette,
}

/// Names accepted by [`PlaybackProfile::preset`]
pub const PRESET_NAMES: [&str; 4] = ["waterfall", "lane", "big", "frequency"];

fn multiplier_ladder() -> Vec<LadderRung> {
    vec![LadderRung::new(1.0, 0.1), LadderRung::new(10.0, 0.5)]
}

fn frequency_ladder() -> Vec<LadderRung> {
    vec![
        LadderRung::new(10.0, 1.0),
        LadderRung::new(100.0, 5.0),
        LadderRung::new(1_000.0, 10.0),
        LadderRung::new(10_000.0, 100.0),
        LadderRung::new(100_000.0, 1_000.0),
    ]
}

impl PlaybackProfile {
    fn multiplier(name: &str, frame_width: u32, frame_height: u32, palette: Palette) -> Self {
        Self {
            name: name.to_string(),
            frame_width,
            frame_height,
            rate_model: RateModel::Multiplier {
                base_frame_rate: BASE_FRAME_RATE,
            },
            baseline: 1.0,
            initial_rate: 1.0,
            ladder: multiplier_ladder(),
            top_step: 1.0,
            default_loop_frames: DEFAULT_LOOP_FRAMES,
            palette,
        }
    }

    /// 64x128 tall strip, rainbow palette, continuous multiplier
    pub fn waterfall() -> Self {
        Self::multiplier("waterfall", 64, 128, Palette::Rainbow)
    }

    /// 910x512 wide lane, rainbow palette, continuous multiplier
    pub fn lane() -> Self {
        Self::multiplier("lane", 910, 512, Palette::Rainbow)
    }

    /// 64x64 square, heatmap palette, continuous multiplier
    pub fn big() -> Self {
        Self::multiplier("big", 64, 64, Palette::Heatmap)
    }

    /// 455x256 frames driven by an integer frequency
    pub fn frequency() -> Self {
        Self {
            name: "frequency".to_string(),
            frame_width: 455,
            frame_height: 256,
            rate_model: RateModel::Frequency {
                reference_hz: REFERENCE_FREQUENCY,
                max_magnitude: MAX_FREQUENCY,
            },
            baseline: REFERENCE_FREQUENCY,
            initial_rate: 14_000.0,
            ladder: frequency_ladder(),
            top_step: 10_000.0,
            default_loop_frames: DEFAULT_LOOP_FRAMES,
            palette: Palette::Rainbow,
        }
    }

    /// Look up a preset by name (case-insensitive)
    pub fn preset(name: &str) -> Result<Self, ProfileError> {
        match name.to_ascii_lowercase().as_str() {
            "waterfall" => Ok(Self::waterfall()),
            "lane" => Ok(Self::lane()),
            "big" => Ok(Self::big()),
            "frequency" => Ok(Self::frequency()),
            _ => Err(ProfileError::UnknownPreset(name.to_string())),
        }
    }

    /// Bytes in one frame (width x height)
    pub fn frame_bytes(&self) -> u32 {
        self.frame_width.saturating_mul(self.frame_height)
    }

    /// Bytes advanced per output sample for a rate magnitude of 1
    pub fn bytes_per_unit(&self, sample_rate: u32) -> f64 {
        match self.rate_model {
            RateModel::Multiplier { base_frame_rate } => {
                self.frame_bytes() as f64 * base_frame_rate / sample_rate.max(1) as f64
            }
            RateModel::Frequency { reference_hz, .. } => 1.0 / reference_hz,
        }
    }

    /// Magnitude clamp, if the model has one
    pub fn max_magnitude(&self) -> Option<f64> {
        match self.rate_model {
            RateModel::Multiplier { .. } => None,
            RateModel::Frequency { max_magnitude, .. } => Some(max_magnitude),
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ProfileError::ZeroFrame {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        if self.frame_width.checked_mul(self.frame_height).is_none() {
            return Err(ProfileError::FrameTooLarge {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        if !self.baseline.is_finite() || self.baseline <= 0.0 {
            return Err(ProfileError::InvalidBaseline(self.baseline));
        }
        match self.rate_model {
            RateModel::Multiplier { base_frame_rate } => {
                if !base_frame_rate.is_finite() || base_frame_rate <= 0.0 {
                    return Err(ProfileError::InvalidRateModel(format!(
                        "base frame rate {base_frame_rate}"
                    )));
                }
            }
            RateModel::Frequency {
                reference_hz,
                max_magnitude,
            } => {
                if !reference_hz.is_finite() || reference_hz <= 0.0 {
                    return Err(ProfileError::InvalidRateModel(format!(
                        "reference frequency {reference_hz}"
                    )));
                }
                if !max_magnitude.is_finite() || max_magnitude < self.baseline {
                    return Err(ProfileError::InvalidRateModel(format!(
                        "max magnitude {max_magnitude} below baseline {}",
                        self.baseline
                    )));
                }
            }
        }
        if !self.initial_rate.is_finite() || self.initial_rate < 0.0 {
            return Err(ProfileError::InvalidRateModel(format!(
                "initial rate {}",
                self.initial_rate
            )));
        }
        let mut last = 0.0;
        for rung in &self.ladder {
            if rung.below <= last || !rung.below.is_finite() || rung.step <= 0.0 {
                return Err(ProfileError::InvalidLadder);
            }
            last = rung.below;
        }
        if self.ladder.is_empty() || self.top_step <= 0.0 || !self.top_step.is_finite() {
            return Err(ProfileError::InvalidLadder);
        }
        if self.default_loop_frames == 0 {
            return Err(ProfileError::EmptyDefaultLoop);
        }
        Ok(())
    }
}

impl Default for PlaybackProfile {
    fn default() -> Self {
        Self::waterfall()
    }
}
