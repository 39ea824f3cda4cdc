//! Frame decoding and sampling.
//!
//! Converts semi-planar NV21 frames into packed ARGB and reduces each
//! converted frame to one representative color.

mod nv21;
mod pixels;
mod sample;

pub use nv21::decode_nv21;
pub use pixels::PixelBuffer;
pub use sample::{center_sample, Sample};

use crate::capture::{FrameError, RawFrame};

/// Decodes a raw NV21 buffer and returns its center color.
pub fn sample_frame(data: &[u8], width: u32, height: u32) -> Result<Sample, FrameError> {
    let frame = RawFrame::new(data, width, height)?;
    center_sample(&decode_nv21(&frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_frame_picks_center_block() {
        // 4x4 frame, white luma, chroma for the bottom-right block is red.
        let mut data = vec![128u8; 16];
        data.extend_from_slice(&[128, 128, 128, 128, 128, 128, 255, 128]);

        let sample = sample_frame(&data, 4, 4).unwrap();
        assert!(sample.red() > sample.blue());
        assert!(sample.red() > sample.green());
    }

    #[test]
    fn test_sample_frame_rejects_malformed() {
        assert!(matches!(
            sample_frame(&[0u8; 10], 4, 4),
            Err(FrameError::Malformed { .. })
        ));
    }
}
