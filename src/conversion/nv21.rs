//! NV21 to packed ARGB conversion.
//!
//! Fixed-point BT.601-style math scaled by 1024. Intermediate channel
//! values live in an 18-bit range before being shifted into their byte.

use super::PixelBuffer;
use crate::capture::RawFrame;

const LUMA_OFFSET: i32 = 16;
const CHROMA_OFFSET: i32 = 128;

const Y_SCALE: i32 = 1192;
const V_TO_R: i32 = 1634;
const V_TO_G: i32 = 833;
const U_TO_G: i32 = 400;
const U_TO_B: i32 = 2066;

/// Upper bound of the 18-bit channel range.
const CHANNEL_MAX: i32 = 262_143;

const OPAQUE: u32 = 0xFF00_0000;

/// Converts one NV21 frame into packed ARGB, one output pixel per luma
/// sample.
///
/// Chroma pairs are stored V first, then U. Each pair covers a 2x2 block
/// of luma samples.
pub fn decode_nv21(frame: &RawFrame<'_>) -> PixelBuffer {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let data = frame.data();
    let frame_size = width * height;

    let mut rgb = Vec::with_capacity(frame_size);
    for row in 0..height {
        let mut uvp = frame_size + (row >> 1) * width;
        let (mut u, mut v) = (0, 0);

        for col in 0..width {
            let y = i32::from(data[row * width + col]);
            if col & 1 == 0 {
                v = i32::from(data[uvp]) - CHROMA_OFFSET;
                u = i32::from(data[uvp + 1]) - CHROMA_OFFSET;
                uvp += 2;
            }
            rgb.push(yuv_to_argb(y, u, v));
        }
    }

    PixelBuffer::from_parts(rgb, frame.width(), frame.height())
}

/// Packs one pixel. `y` is the raw luma byte, `u` and `v` are already
/// centered on zero.
#[inline]
pub(crate) fn yuv_to_argb(y: i32, u: i32, v: i32) -> u32 {
    // Lower bound only; bright luma is left for the channel clamp.
    let y = (y - LUMA_OFFSET).max(0);

    let y1192 = Y_SCALE * y;
    let r = (y1192 + V_TO_R * v).clamp(0, CHANNEL_MAX) as u32;
    let g = (y1192 - V_TO_G * v - U_TO_G * u).clamp(0, CHANNEL_MAX) as u32;
    let b = (y1192 + U_TO_B * u).clamp(0, CHANNEL_MAX) as u32;

    OPAQUE | ((r << 6) & 0x00FF_0000) | ((g >> 2) & 0x0000_FF00) | ((b >> 10) & 0x0000_00FF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uniform_frame(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
        let luma = (width * height) as usize;
        let mut data = vec![y; luma];
        for _ in 0..luma / 4 {
            data.push(v);
            data.push(u);
        }
        data
    }

    fn decode(data: &[u8], width: u32, height: u32) -> PixelBuffer {
        decode_nv21(&RawFrame::new(data, width, height).unwrap())
    }

    #[test]
    fn test_white_frame() {
        let data = uniform_frame(8, 6, 235, 128, 128);
        let rgb = decode(&data, 8, 6);

        assert_eq!(rgb.pixels().len(), 48);
        // 219 * 1192 = 261048, just under the 18-bit ceiling.
        assert!(rgb.pixels().iter().all(|&p| p == 0xFFFE_FEFE));
    }

    #[test]
    fn test_black_and_sub_black_luma() {
        assert_eq!(yuv_to_argb(16, 0, 0), 0xFF00_0000);
        assert_eq!(yuv_to_argb(0, 0, 0), 0xFF00_0000);
    }

    #[test]
    fn test_saturates_high() {
        let data = uniform_frame(2, 2, 255, 128, 128);
        assert_eq!(decode(&data, 2, 2).pixels(), &[0xFFFF_FFFF; 4]);

        let data = uniform_frame(2, 2, 255, 255, 255);
        let pixel = decode(&data, 2, 2).pixels()[0];
        assert_eq!(pixel, 0xFFFF_7DFF);
        assert_eq!((pixel >> 16) & 0xFF, 0xFF);
        assert_eq!(pixel & 0xFF, 0xFF);
    }

    #[test]
    fn test_saturates_low() {
        // v = -128 drives red negative, u = 0 keeps blue at zero.
        let data = uniform_frame(2, 2, 16, 128, 0);
        let pixel = decode(&data, 2, 2).pixels()[0];
        assert_eq!(pixel, 0xFF00_6800);

        let data = uniform_frame(2, 2, 0, 0, 0);
        let pixel = decode(&data, 2, 2).pixels()[0];
        assert_eq!(pixel, 0xFF00_9A00);
        assert_eq!((pixel >> 16) & 0xFF, 0x00);
        assert_eq!(pixel & 0xFF, 0x00);
    }

    #[test]
    fn test_chroma_is_read_v_then_u() {
        // First chroma byte is V. With (200, 60) the result is red-orange;
        // reading it as U first would give 0xFF159DFF, a light blue.
        let data = uniform_frame(2, 2, 128, 60, 200);
        assert_eq!(&data[4..], &[200, 60]);

        let pixel = decode(&data, 2, 2).pixels()[0];
        assert_eq!(pixel, 0xFFF5_6200);
        assert_ne!(pixel, 0xFF15_9DFF);
    }

    #[test]
    fn test_chroma_shared_by_2x2_block() {
        // 4x4 frame: four chroma pairs, one per 2x2 block.
        let mut data = vec![128u8; 16];
        data.extend_from_slice(&[200, 60, 128, 128, 60, 200, 128, 255]);
        let rgb = decode(&data, 4, 4);

        let block = |x: u32, y: u32| rgb.get(x, y).unwrap();
        for (bx, by) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            let expected = block(bx, by);
            assert_eq!(block(bx + 1, by), expected);
            assert_eq!(block(bx, by + 1), expected);
            assert_eq!(block(bx + 1, by + 1), expected);
        }

        assert_eq!(block(0, 0), yuv_to_argb(128, 60 - 128, 200 - 128));
        assert_eq!(block(2, 0), yuv_to_argb(128, 0, 0));
        assert_eq!(block(0, 2), yuv_to_argb(128, 200 - 128, 60 - 128));
        assert_eq!(block(2, 2), yuv_to_argb(128, 255 - 128, 0));
    }

    #[test]
    fn test_luma_is_per_pixel() {
        let mut data: Vec<u8> = vec![16, 235, 235, 16];
        data.extend_from_slice(&[128, 128]);
        let rgb = decode(&data, 2, 2);

        assert_eq!(rgb.pixels(), &[0xFF00_0000, 0xFFFE_FEFE, 0xFFFE_FEFE, 0xFF00_0000]);
    }

    proptest! {
        #[test]
        fn prop_output_is_opaque_and_sized(
            (w, h, data) in (1u32..8, 1u32..8).prop_flat_map(|(hw, hh)| {
                let (w, h) = (hw * 2, hh * 2);
                (Just(w), Just(h), proptest::collection::vec(any::<u8>(), RawFrame::expected_len(w, h)))
            })
        ) {
            let rgb = decode(&data, w, h);
            prop_assert_eq!(rgb.pixels().len(), (w * h) as usize);
            prop_assert!(rgb.pixels().iter().all(|&p| p >> 24 == 0xFF));
        }

        #[test]
        fn prop_neutral_chroma_is_gray(y in any::<u8>()) {
            let pixel = yuv_to_argb(i32::from(y), 0, 0);
            let (r, g, b) = ((pixel >> 16) & 0xFF, (pixel >> 8) & 0xFF, pixel & 0xFF);
            prop_assert_eq!(r, g);
            prop_assert_eq!(g, b);
        }
    }
}
