//! Packed ARGB pixel buffer.

use crate::capture::FrameError;

/// Row-major buffer of packed `0xAARRGGBB` colors.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Wraps packed pixels, checking that the length matches the dimensions.
    pub fn from_pixels(pixels: Vec<u32>, width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(FrameError::Malformed {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Caller guarantees `pixels.len() == width * height`.
    pub(crate) fn from_parts(pixels: Vec<u32>, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize));
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Packed colors in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_must_match() {
        assert!(PixelBuffer::from_pixels(vec![0; 12], 4, 3).is_ok());
        assert!(matches!(
            PixelBuffer::from_pixels(vec![0; 11], 4, 3),
            Err(FrameError::Malformed { expected: 12, actual: 11, .. })
        ));
    }

    #[test]
    fn test_get_is_row_major() {
        let buffer = PixelBuffer::from_pixels((0..12).collect(), 4, 3).unwrap();
        assert_eq!(buffer.get(1, 2), Some(9));
        assert_eq!(buffer.get(4, 0), None);
    }
}
