//! Control side of the generation thread

use std::sync::mpsc::{SyncSender, TrySendError};
use std::thread::JoinHandle;

use tracing::warn;
use waterfall_core::{Command, PlaybackSnapshot};

use super::snapshot::SharedSnapshot;

/// Owned by the main thread; dropping it stops and joins the generator
pub struct AudioGenHandle {
    /// `None` only during drop
    pub(super) tx: Option<SyncSender<Command>>,
    pub(super) handle: Option<JoinHandle<()>>,
    pub(super) snapshot: SharedSnapshot,
}

impl AudioGenHandle {
    /// Queue a command for the next block boundary without blocking
    ///
    /// Returns false when the command was dropped (full queue or dead thread).
    pub fn send(&self, command: Command) -> bool {
        let result = match &self.tx {
            Some(tx) => tx.try_send(command),
            None => Err(TrySendError::Disconnected(command)),
        };
        match result {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!(command = ?dropped, "Audio command queue full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(dropped)) => {
                warn!(command = ?dropped, "Audio thread gone, dropping command");
                false
            }
        }
    }

    /// Most recently published playback state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.load()
    }

    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AudioGenHandle {
    fn drop(&mut self) {
        // Disconnect before join: the loop only exits on a closed channel
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Audio generation thread panicked");
            }
        }
    }
}
