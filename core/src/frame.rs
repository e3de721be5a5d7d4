//! Backend-neutral RGB frames and the decoding seam used by rendering.

use std::fmt;

const CHANNELS: usize = 3;

/// Row-major 8-bit RGB image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// All-black frame of the requested dimensions.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
        }
    }

    /// Wraps raw RGB bytes; `None` when the buffer does not match the dimensions.
    #[must_use]
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == buffer_len(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw row-major RGB bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the frame, returning its RGB bytes.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGB value at `(x, y)`, if inside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let rgb = self.pixels.get(start..start + CHANNELS)?;
        Some([rgb[0], rgb[1], rgb[2]])
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}

/// Turns an encoded image returned by the server into a [`Frame`].
pub trait FrameDecoder {
    /// Reason a payload could not be decoded.
    type Error: fmt::Display;

    /// Decodes `bytes` into an RGB frame.
    fn decode(&self, bytes: &[u8]) -> Result<Frame, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::Frame;

    #[test]
    fn blank_frame_is_black_and_sized() {
        let frame = Frame::blank(4, 3);
        assert_eq!(frame.dimensions(), (4, 3));
        assert_eq!(frame.pixels().len(), 36);
        assert!(frame.pixels().iter().all(|channel| *channel == 0));
    }

    #[test]
    fn raw_buffers_must_match_dimensions() {
        assert!(Frame::from_rgb(2, 1, vec![0; 5]).is_none());

        let frame = Frame::from_rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).expect("sizes match");
        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.pixel(0, 1), None);
    }
}
