//! Waterfall player: audio device, render ticker and control input around
//! the core playback engine.
//!
//! The generation thread owns the [`waterfall_core::Session`]; everything
//! else talks to it through commands and published snapshots.

pub mod app;
pub mod audio_thread;
pub mod capture;
pub mod config;
pub mod input;
pub mod render;

pub use app::{App, ExitReason};
pub use audio_thread::{AudioError, SharedSnapshot, ThreadedAudioOutput};
pub use capture::FrameCapture;
pub use config::{Config, ConfigError};
pub use input::{ControlEvent, InputError, KeyAction, KeyBindings};
pub use render::{FrameTicker, StatusReporter};
