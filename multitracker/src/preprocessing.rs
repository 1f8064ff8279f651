//! Fixed frame preprocessing chain applied before tracking and display
//!
//! Each frame goes through, in this order:
//! 1. 3x3 Gaussian blur (kernel derived from the size, `[1 2 1] / 4` per axis)
//! 2. Grayscale conversion (`RGB2GRAY` coefficients on the decoder's BGR channel order)
//! 3. Horizontal Sobel derivative, saturated to 8 bits
//!
//! All three steps mirror OpenCV's 8-bit arithmetic (fixed-point rounding,
//! `BORDER_REFLECT_101` borders) so results match frames filtered with
//! `GaussianBlur`, `cvtColor` and `Sobel`.

use image::{GrayImage, Luma, Rgb, RgbImage};
use roitrack::TemplateFactory;

/// One stage of the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessStep {
    GaussianBlur,
    Grayscale,
    SobelX,
}

/// Stateless preprocessor running the fixed chain
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgePreprocessor;

impl EdgePreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Stages in the order they are applied
    pub fn steps(&self) -> [PreprocessStep; 3] {
        [
            PreprocessStep::GaussianBlur,
            PreprocessStep::Grayscale,
            PreprocessStep::SobelX,
        ]
    }

    /// Run the full chain on an acquired frame
    pub fn apply(&self, frame: &RgbImage) -> GrayImage {
        let blurred = gaussian_blur_3x3(frame);
        let gray = to_grayscale(&blurred);
        sobel_x(&gray)
    }
}

/// Full chain as a free function, usable as a bind-frame reducer
pub fn edge_frame(frame: &RgbImage) -> GrayImage {
    EdgePreprocessor::new().apply(frame)
}

/// Built-in trackers that cut their templates from the edge image of the bind frame
///
/// The bind frame itself is the acquired color frame; only the template
/// backend reduces it, so its model lives in the same space as the
/// preprocessed frames it is updated with.
pub fn edge_template_factory() -> TemplateFactory {
    TemplateFactory::with_reducer(edge_frame)
}

/// Mirror an out-of-range coordinate back into `[0, len)` without repeating the edge pixel
#[inline]
fn reflect_101(i: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let i = if i < 0 { -i } else { i };
    let i = if i >= len { 2 * len - 2 - i } else { i };
    i as u32
}

/// 3x3 Gaussian blur with the fixed `[1 2 1] x [1 2 1] / 16` kernel
pub fn gaussian_blur_3x3(frame: &RgbImage) -> RgbImage {
    const WEIGHTS: [u32; 3] = [1, 2, 1];
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return frame.clone();
    }

    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0u32; 3];
        for (ky, wy) in WEIGHTS.iter().enumerate() {
            let sy = reflect_101(y as i64 + ky as i64 - 1, height);
            for (kx, wx) in WEIGHTS.iter().enumerate() {
                let sx = reflect_101(x as i64 + kx as i64 - 1, width);
                let pixel = frame.get_pixel(sx, sy);
                for (sum, channel) in acc.iter_mut().zip(pixel.0) {
                    *sum += wy * wx * channel as u32;
                }
            }
        }
        Rgb(acc.map(|sum| ((sum + 8) >> 4) as u8))
    })
}

/// Grayscale with OpenCV's 14-bit fixed-point `RGB2GRAY` coefficients
///
/// Decoded video frames are BGR, and `RGB2GRAY` applied to them puts the
/// 0.299 weight on blue and 0.114 on red. Frames here are RGB, so the
/// weights are placed the same way: blue 0.299, green 0.587, red 0.114.
pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    const R: u32 = 1868;
    const G: u32 = 9617;
    const B: u32 = 4899;

    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let luma = (r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13)) >> 14;
        Luma([luma as u8])
    })
}

/// First derivative in x with the 3x3 Sobel kernel
///
/// Negative responses saturate to 0, so only dark-to-bright edges (scanning
/// left to right) survive.
pub fn sobel_x(frame: &GrayImage) -> GrayImage {
    const SMOOTH: [i32; 3] = [1, 2, 1];
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return frame.clone();
    }

    GrayImage::from_fn(width, height, |x, y| {
        let left = reflect_101(x as i64 - 1, width);
        let right = reflect_101(x as i64 + 1, width);

        let mut acc = 0i32;
        for (ky, weight) in SMOOTH.iter().enumerate() {
            let sy = reflect_101(y as i64 + ky as i64 - 1, height);
            let diff = frame.get_pixel(right, sy)[0] as i32 - frame.get_pixel(left, sy)[0] as i32;
            acc += weight * diff;
        }
        Luma([acc.clamp(0, 255) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(1, 1), 0);
    }

    #[test]
    fn test_blur_keeps_uniform_image() {
        let frame = RgbImage::from_pixel(7, 5, Rgb([10, 128, 250]));
        assert_eq!(gaussian_blur_3x3(&frame), frame);
    }

    #[test]
    fn test_blur_spreads_single_pixel() {
        let mut frame = RgbImage::new(5, 5);
        frame.put_pixel(2, 2, Rgb([160, 0, 0]));
        let blurred = gaussian_blur_3x3(&frame);

        assert_eq!(blurred.get_pixel(2, 2)[0], 40); // 160 * 4 / 16
        assert_eq!(blurred.get_pixel(1, 2)[0], 20); // 160 * 2 / 16
        assert_eq!(blurred.get_pixel(1, 1)[0], 10); // 160 * 1 / 16
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_grayscale_weights() {
        let mut frame = RgbImage::new(4, 1);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 255, 0]));
        frame.put_pixel(2, 0, Rgb([0, 0, 255]));
        frame.put_pixel(3, 0, Rgb([255, 255, 255]));
        let gray = to_grayscale(&frame);

        assert_eq!(gray.get_pixel(0, 0)[0], 29);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 76);
        assert_eq!(gray.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn test_sobel_step_edges() {
        // Dark left half, bright right half: rising edge between x=3 and x=4
        let rising = GrayImage::from_fn(8, 4, |x, _| Luma([if x < 4 { 0 } else { 50 }]));
        let edges = sobel_x(&rising);
        assert_eq!(edges.get_pixel(3, 1)[0], 200); // (50 - 0) * (1 + 2 + 1)
        assert_eq!(edges.get_pixel(4, 1)[0], 200);
        assert_eq!(edges.get_pixel(1, 1)[0], 0);
        assert_eq!(edges.get_pixel(6, 1)[0], 0);

        // Falling edge saturates to zero
        let falling = GrayImage::from_fn(8, 4, |x, _| Luma([if x < 4 { 200 } else { 0 }]));
        assert!(sobel_x(&falling).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_sobel_border_is_reflected() {
        // Reflect-101 makes the derivative vanish at both vertical borders
        let ramp = GrayImage::from_fn(5, 3, |x, _| Luma([(x * 10) as u8]));
        let edges = sobel_x(&ramp);
        assert_eq!(edges.get_pixel(0, 1)[0], 0);
        assert_eq!(edges.get_pixel(4, 1)[0], 0);
        assert_eq!(edges.get_pixel(2, 1)[0], 80); // (30 - 10) * 4
    }

    #[test]
    fn test_chain_order() {
        let preprocessor = EdgePreprocessor::new();
        assert_eq!(
            preprocessor.steps(),
            [
                PreprocessStep::GaussianBlur,
                PreprocessStep::Grayscale,
                PreprocessStep::SobelX
            ]
        );

        let frame = RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 15) as u8, (y * 20) as u8, 90]));
        let expected = sobel_x(&to_grayscale(&gaussian_blur_3x3(&frame)));
        assert_eq!(preprocessor.apply(&frame), expected);
    }

    #[test]
    fn test_blue_weighs_more_than_red() {
        let red = RgbImage::from_pixel(1, 1, Rgb([200, 0, 0]));
        let blue = RgbImage::from_pixel(1, 1, Rgb([0, 0, 200]));
        // 200 * 1868 / 16384 and 200 * 4899 / 16384, rounded
        assert_eq!(to_grayscale(&red).get_pixel(0, 0)[0], 23);
        assert_eq!(to_grayscale(&blue).get_pixel(0, 0)[0], 60);
    }

    #[test]
    fn test_edge_frame_matches_chain() {
        let frame = RgbImage::from_fn(9, 7, |x, y| Rgb([(x * 25) as u8, 40, (y * 30) as u8]));
        assert_eq!(edge_frame(&frame), EdgePreprocessor::new().apply(&frame));
    }

    #[test]
    fn test_empty_frame() {
        let frame = RgbImage::new(0, 0);
        assert_eq!(EdgePreprocessor::new().apply(&frame).dimensions(), (0, 0));
    }
}
