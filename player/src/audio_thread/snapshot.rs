//! Snapshot hand-off from the generation thread to readers

use std::sync::{Arc, Mutex};

use waterfall_core::PlaybackSnapshot;

/// Latest published playback state
///
/// The lock is only ever held for one `Copy` of the snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<PlaybackSnapshot>>,
}

impl SharedSnapshot {
    pub fn new(initial: PlaybackSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn publish(&self, snapshot: PlaybackSnapshot) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    pub fn load(&self) -> PlaybackSnapshot {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
