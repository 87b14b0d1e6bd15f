//! Error types for loading buffers and validating profiles

use std::path::PathBuf;

/// Failure to turn a file into a playable [`ByteBuffer`](crate::ByteBuffer)
///
/// Only the current load attempt is aborted; callers may retry with
/// another file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has zero length
    #[error("file is empty")]
    Empty,

    /// The file is shorter than a single frame
    #[error("file too small for even one frame ({len} bytes, frame needs {frame_bytes})")]
    TooSmall { len: usize, frame_bytes: u32 },
}

/// Invalid [`PlaybackProfile`](crate::PlaybackProfile) values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    /// Frame width or height is zero
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    ZeroFrame { width: u32, height: u32 },

    /// Frame area does not fit in a u32 byte count
    #[error("frame {width}x{height} is too large")]
    FrameTooLarge { width: u32, height: u32 },

    /// Baseline rate unit must be finite and > 0
    #[error("baseline rate must be a positive finite number (got {0})")]
    InvalidBaseline(f64),

    /// Rate ladder thresholds must be strictly increasing with positive steps
    #[error("rate ladder must be strictly increasing with positive steps")]
    InvalidLadder,

    /// Rate model constants (base frame rate, reference frequency, max) invalid
    #[error("invalid rate model: {0}")]
    InvalidRateModel(String),

    /// Default loop must span at least one frame
    #[error("default loop must cover at least one frame")]
    EmptyDefaultLoop,

    /// No preset with this name
    #[error("unknown profile preset '{0}'")]
    UnknownPreset(String),
}
