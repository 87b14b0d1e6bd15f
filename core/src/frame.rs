//! Position to display frame mapping

use crate::advance::wrap;
use crate::buffer::ByteBuffer;

/// Maps a cursor position to the frame the render context should draw
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameIndexer;

impl FrameIndexer {
    /// Index of the frame containing `position`
    ///
    /// The position is wrapped into the buffer first. Bytes past the last
    /// whole frame map to the last frame.
    pub fn frame_index(position: f64, buffer: &ByteBuffer) -> u32 {
        let wrapped = wrap(position, buffer.len() as f64);
        let idx = (wrapped / buffer.frame_bytes() as f64).floor() as u64;
        let last = buffer.total_frames().saturating_sub(1) as u64;
        idx.min(last) as u32
    }

    /// Byte offset of the frame containing `position`
    pub fn frame_offset(position: f64, buffer: &ByteBuffer) -> usize {
        Self::frame_index(position, buffer) as usize * buffer.frame_bytes() as usize
    }
}
