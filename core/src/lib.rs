//! Waterfall core: playback position engine
//!
//! Treats an arbitrary file's bytes as both a raw 8-bit PCM waveform and a
//! sequence of fixed-size raster frames. A single real-valued cursor walks the
//! buffer at a signed, tunable rate and is consumed by two readers running at
//! very different cadences:
//!
//! ```text
//! Audio context (per sample)             Render context (per visual tick)
//!     │                                        │
//! [PositionAdvancer::advance]                  │
//!     │  (wrap / pin / reflect)                │
//! [SampleSynthesizer::synthesize]        [FrameIndexer::frame_offset]
//!     │                                  [Palette::color per byte]
//!  stereo f32 out                         RGBA frame out
//! ```
//!
//! Everything device-, window- or keyboard-specific lives in the player crate.
//! This crate only holds the state machine, the byte buffer and the pure
//! mappings from position to sample and frame.

mod advance;
mod buffer;
mod command;
mod error;
mod frame;
mod palette;
mod profile;
mod rate;
mod session;
mod state;
mod status;
mod synth;

pub use advance::{CrossAction, CrossEvent, Crossing, LoopRegion, PositionAdvancer, wrap};
pub use buffer::ByteBuffer;
pub use command::Command;
pub use error::{LoadError, ProfileError};
pub use frame::FrameIndexer;
pub use palette::{
    HEATMAP_BANDS, Palette, RAINBOW, rainbow_components, rasterize_frame, tile_frames,
};
pub use profile::{
    BASE_FRAME_RATE, DEFAULT_LOOP_FRAMES, LadderRung, MAX_FREQUENCY, PRESET_NAMES, PlaybackProfile,
    REFERENCE_FREQUENCY, RateModel,
};
pub use rate::RateController;
pub use session::Session;
pub use state::{Direction, PlaybackSnapshot, PlaybackState, Rate};
pub use status::StatusLine;
pub use synth::SampleSynthesizer;

/// Upper bound of the user volume control
pub const MAX_VOLUME: f64 = 2.0;

/// Volume step used by the default +/- bindings
pub const VOLUME_STEP: f64 = 0.05;
