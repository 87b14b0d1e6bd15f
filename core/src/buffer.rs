//! Immutable byte buffer with derived frame geometry

use std::path::Path;

use tracing::info;

use crate::error::LoadError;

/// A loaded file: the bytes plus how many whole frames they hold
///
/// Created once at load, read-only for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    frame_bytes: u32,
    total_frames: u32,
}

impl ByteBuffer {
    /// Read a file from disk
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is empty, or is shorter than one
    /// frame of `frame_bytes`.
    pub fn load(path: impl AsRef<Path>, frame_bytes: u32) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let buffer = Self::from_bytes(bytes, frame_bytes)?;
        info!(
            "Loaded {} bytes from {} ({} frames of {} bytes)",
            buffer.len(),
            path.display(),
            buffer.total_frames,
            buffer.frame_bytes
        );
        Ok(buffer)
    }

    /// Wrap bytes already in memory
    pub fn from_bytes(bytes: Vec<u8>, frame_bytes: u32) -> Result<Self, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        let frame_bytes = frame_bytes.max(1);
        let total_frames = bytes.len() / frame_bytes as usize;
        if total_frames == 0 {
            return Err(LoadError::TooSmall {
                len: bytes.len(),
                frame_bytes,
            });
        }
        Ok(Self {
            bytes,
            frame_bytes,
            total_frames: total_frames.min(u32::MAX as usize) as u32,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes per frame (width x height)
    pub fn frame_bytes(&self) -> u32 {
        self.frame_bytes
    }

    /// Whole frames in the buffer (trailing partial frame excluded)
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Byte at `floor(clamp(position, 0, len - 1))`
    #[inline]
    pub fn byte_at(&self, position: f64) -> u8 {
        let last = self.bytes.len().saturating_sub(1);
        let index = (position.clamp(0.0, last as f64) as usize).min(last);
        self.bytes[index]
    }

    /// One frame's bytes starting at `offset`
    pub fn frame(&self, offset: usize) -> &[u8] {
        let start = offset.min(self.bytes.len());
        let end = start
            .saturating_add(self.frame_bytes as usize)
            .min(self.bytes.len());
        &self.bytes[start..end]
    }
}
