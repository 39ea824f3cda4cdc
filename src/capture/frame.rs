//! Raw NV21 frame view handed over by the capture device.

use thiserror::Error;

/// Errors for frame buffers whose layout does not match their dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A zero width or height.
    #[error("frame has no pixels ({width}x{height})")]
    Empty {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },
    /// Chroma is subsampled 2:1, so both dimensions must be even.
    #[error("frame dimensions must be even, got {width}x{height}")]
    OddDimensions {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },
    /// Buffer length differs from `width * height * 3 / 2`.
    #[error("malformed frame: {width}x{height} needs {expected} bytes, got {actual}")]
    Malformed {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Bytes required by the dimensions.
        expected: usize,
        /// Bytes actually supplied.
        actual: usize,
    },
}

/// A borrowed semi-planar frame: full-resolution luma plane followed by
/// an interleaved V/U plane subsampled 2:1 in both axes.
///
/// The view only lives as long as the device callback that produced it.
/// Anything needed afterwards has to be copied out.
#[derive(Clone, Copy)]
pub struct RawFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RawFrame<'a> {
    /// Wraps a device buffer after checking it against the declared size.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(FrameError::OddDimensions { width, height });
        }

        let expected = Self::expected_len(width, height);
        if data.len() != expected {
            return Err(FrameError::Malformed {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Number of bytes an NV21 buffer of the given size occupies.
    #[inline]
    pub fn expected_len(width: u32, height: u32) -> usize {
        let luma = (width as usize) * (height as usize);
        luma + luma / 2
    }

    /// Returns the whole buffer, luma plane first.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the luma plane.
    #[inline]
    pub fn luma(&self) -> &'a [u8] {
        &self.data[..self.pixel_count()]
    }

    /// Returns the interleaved V/U plane.
    #[inline]
    pub fn chroma(&self) -> &'a [u8] {
        &self.data[self.pixel_count()..]
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl std::fmt::Debug for RawFrame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![0u8; 640 * 480 * 3 / 2];
        let frame = RawFrame::new(&data, 640, 480).unwrap();

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
        assert_eq!(frame.luma().len(), 640 * 480);
        assert_eq!(frame.chroma().len(), 640 * 480 / 2);
    }

    #[test]
    fn test_short_buffer_is_malformed() {
        let data = vec![0u8; 100];
        let err = RawFrame::new(&data, 640, 480).unwrap_err();

        assert_eq!(
            err,
            FrameError::Malformed {
                width: 640,
                height: 480,
                expected: 460_800,
                actual: 100,
            }
        );
    }

    #[test]
    fn test_long_buffer_is_malformed() {
        let data = vec![0u8; 4 * 4 * 3 / 2 + 1];
        assert!(matches!(
            RawFrame::new(&data, 4, 4),
            Err(FrameError::Malformed { .. })
        ));
    }

    #[test]
    fn test_odd_and_zero_dimensions_rejected() {
        let data = vec![0u8; 64];
        assert!(matches!(
            RawFrame::new(&data, 3, 4),
            Err(FrameError::OddDimensions { .. })
        ));
        assert!(matches!(
            RawFrame::new(&[], 0, 4),
            Err(FrameError::Empty { .. })
        ));
    }
}
