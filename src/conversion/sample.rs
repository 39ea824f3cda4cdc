//! Single-color samples taken from converted frames.

use super::PixelBuffer;
use crate::capture::FrameError;
use serde::{Deserialize, Serialize};

/// One packed `0xAARRGGBB` color sampled from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(u32);

impl Sample {
    /// Wraps a packed `0xAARRGGBB` color.
    pub fn from_argb(argb: u32) -> Self {
        Self(argb)
    }

    /// Returns the packed color including alpha.
    #[inline]
    pub fn argb(self) -> u32 {
        self.0
    }

    /// Returns the color with the alpha byte cleared.
    #[inline]
    pub fn rgb(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Red channel.
    #[inline]
    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    #[inline]
    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    #[inline]
    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Renders the color as six lowercase hex digits, no alpha.
    pub fn to_hex(self) -> String {
        format!("{:06x}", self.rgb())
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.rgb())
    }
}

/// Returns the pixel at row `height / 2`, column `width / 2`.
///
/// For even sizes this is the pixel just after the true center.
pub fn center_sample(buffer: &PixelBuffer) -> Result<Sample, FrameError> {
    let (width, height) = (buffer.width(), buffer.height());
    buffer
        .get(width / 2, height / 2)
        .map(Sample::from_argb)
        .ok_or(FrameError::Empty { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of_4x4() {
        let mut pixels = vec![0xFF00_0000u32; 16];
        pixels[10] = 0xFF12_3456;
        let buffer = PixelBuffer::from_pixels(pixels, 4, 4).unwrap();

        let sample = center_sample(&buffer).unwrap();
        assert_eq!(sample.argb(), 0xFF12_3456);
    }

    #[test]
    fn test_center_of_odd_and_wide_buffers() {
        let buffer = PixelBuffer::from_pixels((0..15).collect(), 5, 3).unwrap();
        assert_eq!(center_sample(&buffer).unwrap().argb(), 7);

        let buffer = PixelBuffer::from_pixels((0..8).collect(), 8, 1).unwrap();
        assert_eq!(center_sample(&buffer).unwrap().argb(), 4);
    }

    #[test]
    fn test_empty_buffer_has_no_center() {
        let buffer = PixelBuffer::from_pixels(Vec::new(), 0, 4).unwrap();
        assert_eq!(
            center_sample(&buffer),
            Err(FrameError::Empty {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn test_hex_drops_alpha() {
        let sample = Sample::from_argb(0xFF0A_0B0C);
        assert_eq!(sample.to_hex(), "0a0b0c");
        assert_eq!(sample.to_string(), "#0a0b0c");
        assert_eq!((sample.red(), sample.green(), sample.blue()), (10, 11, 12));
    }
}
