//! Frame capture to PNG
//!
//! Rasterizes the frame under the cursor with the profile's palette and
//! writes it as `<dir>/<file stem>_frame<index>_<n>.png`. With a grid
//! configured, the following frames are tiled row-major after it, wrapping
//! at the end of the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use image::{ImageFormat, RgbaImage};
use waterfall_core::{ByteBuffer, PlaybackProfile, PlaybackSnapshot, rasterize_frame, tile_frames};

pub struct FrameCapture {
    dir: PathBuf,
    prefix: String,
    columns: u32,
    rows: u32,
    /// Captures written this session, used to keep names unique
    count: u32,
    tile: Vec<u8>,
    pixels: Vec<u8>,
}

impl FrameCapture {
    /// Capture single frames into `dir`, naming files after `source`
    pub fn new(dir: impl Into<PathBuf>, source: &Path) -> Self {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());
        Self {
            dir: dir.into(),
            prefix: sanitize_filename(&stem),
            columns: 1,
            rows: 1,
            count: 0,
            tile: Vec::new(),
            pixels: Vec::new(),
        }
    }

    /// Tile `columns x rows` frames per capture (zero counts as one)
    pub fn with_grid(mut self, columns: u32, rows: u32) -> Self {
        self.columns = columns.max(1);
        self.rows = rows.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the grid starting at the snapshot's frame; returns the file written
    pub fn capture(
        &mut self,
        buffer: &ByteBuffer,
        snapshot: &PlaybackSnapshot,
        profile: &PlaybackProfile,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create capture directory {}", self.dir.display()))?;

        let image = self.compose(buffer, snapshot.frame_index, profile)?;

        self.count += 1;
        let path = self.dir.join(format!(
            "{}_frame{:06}_{}.png",
            self.prefix,
            snapshot.frame_index + 1,
            self.count
        ));
        let saved = image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()));
        self.pixels = image.into_raw();
        saved?;

        tracing::info!("Frame captured: {}", path.display());
        Ok(path)
    }

    fn compose(
        &mut self,
        buffer: &ByteBuffer,
        first: u32,
        profile: &PlaybackProfile,
    ) -> Result<RgbaImage> {
        let (frame_w, frame_h) = (profile.frame_width as usize, profile.frame_height as usize);
        let frame_bytes = buffer.frame_bytes() as usize;
        ensure!(
            frame_bytes == frame_w * frame_h,
            "Buffer frames are {} bytes but the profile draws {}x{}",
            frame_bytes,
            frame_w,
            frame_h
        );

        let columns = self.columns as usize;
        let width = frame_w * columns;
        let height = frame_h * self.rows as usize;
        let row_bytes = frame_w * 4;
        self.pixels.clear();
        self.pixels.resize(width * height * 4, 0);

        let frames = tile_frames(first, self.columns, self.rows, buffer.total_frames());
        for (i, frame) in frames.into_iter().enumerate() {
            rasterize_frame(buffer, frame as usize * frame_bytes, profile.palette, &mut self.tile);
            let (col, row) = (i % columns, i / columns);
            for y in 0..frame_h {
                let src = &self.tile[y * row_bytes..(y + 1) * row_bytes];
                let dst = ((row * frame_h + y) * width + col * frame_w) * 4;
                self.pixels[dst..dst + row_bytes].copy_from_slice(src);
            }
        }

        RgbaImage::from_raw(width as u32, height as u32, std::mem::take(&mut self.pixels))
            .context("Frame pixels do not match frame dimensions")
    }
}

/// Lowercase alphanumerics, everything else collapsed to single underscores
fn sanitize_filename(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let joined = mapped
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if joined.is_empty() {
        "capture".to_string()
    } else {
        joined
    }
}
