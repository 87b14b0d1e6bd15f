//! Byte to color mapping and frame rasterization

use serde::{Deserialize, Serialize};

use crate::buffer::ByteBuffer;

/// Fixed 18-entry hue table of the rainbow palette
pub const RAINBOW: [[f32; 3]; 18] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.75, 0.8],
    [0.5, 1.0, 0.0],
    [0.0, 0.75, 1.0],
    [0.76, 0.7, 0.0],
    [0.9, 0.3, 0.0],
    [0.58, 0.0, 0.83],
    [0.29, 0.0, 0.51],
    [0.0, 0.42, 0.5],
    [0.0, 1.0, 0.5],
    [0.42, 0.56, 0.14],
    [1.0, 0.65, 0.0],
    [0.4, 0.0, 1.0],
];

/// Byte values sharing one rainbow hue
const RAINBOW_SHADES: u8 = 14;

/// Lower bounds of the heatmap ramps: red, yellow, white
pub const HEATMAP_BANDS: [u8; 3] = [64, 128, 192];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// 18 hues, 14 intensity shades each
    #[default]
    Rainbow,
    /// black -> red -> yellow -> white
    Heatmap,
}

impl Palette {
    /// RGB in `[0, 1]` for one byte
    pub fn color(self, byte: u8) -> [f32; 3] {
        match self {
            Palette::Rainbow => {
                let (index, intensity) = rainbow_components(byte);
                let [r, g, b] = RAINBOW[index];
                [r * intensity, g * intensity, b * intensity]
            }
            Palette::Heatmap => heatmap(byte),
        }
    }

    /// RGBA8 for one byte, opaque
    pub fn rgba(self, byte: u8) -> [u8; 4] {
        let [r, g, b] = self.color(byte);
        [to_u8(r), to_u8(g), to_u8(b), 255]
    }
}

/// Hue table index and intensity of a byte under the rainbow palette
pub fn rainbow_components(byte: u8) -> (usize, f32) {
    let index = (byte / RAINBOW_SHADES) as usize % RAINBOW.len();
    let intensity = ((byte % RAINBOW_SHADES) + 1) as f32 / RAINBOW_SHADES as f32;
    (index, intensity)
}

fn heatmap(byte: u8) -> [f32; 3] {
    let [red, yellow, white] = HEATMAP_BANDS;
    let ramp = |base: u8| (byte - base) as f32 / 63.0;
    if byte < red {
        [ramp(0), 0.0, 0.0]
    } else if byte < yellow {
        [1.0, ramp(red), 0.0]
    } else if byte < white {
        [1.0, 1.0, ramp(yellow)]
    } else {
        [1.0, 1.0, 1.0]
    }
}

#[inline]
fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Rasterize the frame at `offset` into row-major RGBA8
///
/// `out` is cleared and refilled with exactly `frame_bytes * 4` bytes.
/// A short tail (fewer bytes than a frame) is padded with black.
pub fn rasterize_frame(buffer: &ByteBuffer, offset: usize, palette: Palette, out: &mut Vec<u8>) {
    let frame_bytes = buffer.frame_bytes() as usize;
    let frame = buffer.frame(offset);
    out.clear();
    out.reserve(frame_bytes * 4);
    for &byte in frame {
        out.extend_from_slice(&palette.rgba(byte));
    }
    for _ in frame.len()..frame_bytes {
        out.extend_from_slice(&[0, 0, 0, 255]);
    }
}

/// Frame indices of a `columns x rows` grid starting at `start`
///
/// Row-major; each index is `(start + row * columns + column) mod total`.
pub fn tile_frames(start: u32, columns: u32, rows: u32, total: u32) -> Vec<u32> {
    if total == 0 {
        return Vec::new();
    }
    let total = total as u64;
    (0..rows as u64)
        .flat_map(|r| (0..columns as u64).map(move |c| (r, c)))
        .map(|(r, c)| ((start as u64 + r * columns as u64 + c) % total) as u32)
        .collect()
}
