#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Image-backed frame decoding and persistence for the environment and its tooling.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use image::RgbImage;
use tower_gym_core::{Frame, FrameDecoder};

/// Decodes an encoded image returned by the server into an RGB frame.
///
/// Alpha channels are dropped; any format enabled on the `image` crate is accepted.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    if bytes.is_empty() {
        bail!("render response carried no image data");
    }
    let image = image::load_from_memory(bytes)
        .context("failed to decode rendered frame")?
        .to_rgb8();
    let (width, height) = image.dimensions();
    Frame::from_rgb(width, height, image.into_raw())
        .ok_or_else(|| anyhow!("decoded frame has an inconsistent pixel buffer"))
}

/// [`FrameDecoder`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDecoder;

impl FrameDecoder for ImageDecoder {
    type Error = anyhow::Error;

    fn decode(&self, bytes: &[u8]) -> Result<Frame> {
        decode_frame(bytes)
    }
}

fn to_image(frame: &Frame) -> Result<RgbImage> {
    RgbImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
        .ok_or_else(|| anyhow!("frame buffer does not match {:?}", frame.dimensions()))
}

/// Writes numbered PNG frames into a directory.
#[derive(Debug)]
pub struct FrameSink {
    directory: PathBuf,
    written: usize,
}

impl FrameSink {
    /// Creates the target directory when missing.
    pub fn create(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).with_context(|| {
            format!("failed to create frame directory {}", directory.display())
        })?;
        Ok(Self {
            directory,
            written: 0,
        })
    }

    /// Directory receiving the frames.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Saves `frame` as `frame_NNNN.png` and returns its path.
    pub fn write(&mut self, frame: &Frame) -> Result<PathBuf> {
        let path = self.directory.join(frame_file_name(self.written));
        to_image(frame)?
            .save(&path)
            .with_context(|| format!("failed to write frame to {}", path.display()))?;
        self.written += 1;
        Ok(path)
    }
}

fn frame_file_name(index: usize) -> String {
    format!("frame_{index:04}.png")
}
