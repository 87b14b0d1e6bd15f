//! Byte-to-PCM sample synthesis
//!
//! Bytes are treated as unsigned 8-bit PCM centred on 128.

use crate::buffer::ByteBuffer;
use crate::state::PlaybackState;

/// Maps a resolved position to one output sample
///
/// Stateless; never blocks or allocates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSynthesizer;

impl SampleSynthesizer {
    /// Unsigned byte to amplitude in `[-1.0, 0.9921875]`
    #[inline]
    pub fn amplitude(byte: u8) -> f32 {
        (byte as i32 - 128) as f32 / 128.0
    }

    /// Sample at the state's position, scaled by volume
    ///
    /// Silence without touching the buffer when paused, muted or empty.
    #[inline]
    pub fn synthesize(state: &PlaybackState, buffer: &ByteBuffer) -> f32 {
        if state.paused || state.muted || buffer.is_empty() {
            return 0.0;
        }
        let byte = buffer.byte_at(state.position);
        (Self::amplitude(byte) as f64 * state.volume()) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(byte: u8) -> ByteBuffer {
        ByteBuffer::from_bytes(vec![byte; 16], 4).unwrap()
    }

    fn state_with_volume(volume: f64) -> PlaybackState {
        let mut state = PlaybackState::default();
        state.position = 3.0;
        state.set_volume(volume);
        state
    }

    #[test]
    fn test_amplitude_reference_bytes() {
        assert_eq!(SampleSynthesizer::amplitude(128), 0.0);
        assert_eq!(SampleSynthesizer::amplitude(255), 0.9921875);
        assert_eq!(SampleSynthesizer::amplitude(0), -1.0);
    }

    #[test]
    fn test_volume_scales_sample() {
        let state = state_with_volume(0.5);
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer_of(0)), -0.5);
        assert!(
            (SampleSynthesizer::synthesize(&state, &buffer_of(255)) - 0.9921875 * 0.5).abs() < 1e-6
        );

        let loud = state_with_volume(2.0);
        assert_eq!(SampleSynthesizer::synthesize(&loud, &buffer_of(0)), -2.0);
    }

    #[test]
    fn test_paused_or_muted_is_silent() {
        let buffer = buffer_of(0);
        let mut state = state_with_volume(2.0);
        state.paused = true;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), 0.0);

        state.paused = false;
        state.muted = true;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), 0.0);
    }

    #[test]
    fn test_reads_floor_of_position() {
        let buffer = ByteBuffer::from_bytes(vec![0, 64, 128, 192, 255, 10, 20, 30], 4).unwrap();
        let mut state = PlaybackState::default();
        state.position = 2.99;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), 0.0);
        state.position = 3.0;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), 0.5);
    }

    #[test]
    fn test_out_of_range_position_is_clamped() {
        let buffer = ByteBuffer::from_bytes(vec![0, 0, 0, 255], 4).unwrap();
        let mut state = PlaybackState::default();
        state.position = 4.0;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), 0.9921875);
        state.position = -3.0;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), -1.0);
        state.position = f64::NAN;
        assert_eq!(SampleSynthesizer::synthesize(&state, &buffer), -1.0);
    }
}
