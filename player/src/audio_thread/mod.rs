//! Threaded audio generation
//!
//! The generation thread is the only owner of the [`Session`]: it is the sole
//! advancer of the cursor. Everything else talks to it through commands and
//! reads it through published snapshots.
//!
//! # Architecture
//!
//! ```text
//! Main Thread                    Audio Gen Thread              cpal Thread
//!     │                                │                           │
//! [Control event]                      │                           │
//!     │                                │                           │
//! [Command]─────────(channel)──────►[Apply between blocks]         │
//!     │                              [Session::render]             │
//!     │                              [Push]─────────(ring)──────►[Consume]
//!     │                                │                           │
//! [Render tick]◄──(snapshot mutex)──[Publish]                      │
//! ```
//!
//! Without an output device the ring is replaced by a null sink that drains
//! at the nominal sample rate, so the cursor still moves in real time.
//!
//! # Usage
//!
//! ```ignore
//! let audio = ThreadedAudioOutput::new(session);
//! audio.send(Command::TogglePause);
//! let snapshot = audio.snapshot();
//! ```
//!
//! [`Session`]: waterfall_core::Session

mod handle;
mod metrics;
mod output;
mod sink;
mod snapshot;
mod thread;

pub use output::{AudioError, ThreadedAudioOutput};
pub use snapshot::SharedSnapshot;
