/// Image utilities for drawing tracked regions
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use roitrack::Roi;

/// Expand a single-channel frame to RGB so colored boxes can be drawn on it
pub fn gray_to_rgb(frame: &GrayImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let v = frame.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// Draw a thick rectangle on an image
///
/// # Arguments
/// * `img` - The image to draw on
/// * `x` - X coordinate of top-left corner
/// * `y` - Y coordinate of top-left corner
/// * `width` - Width of the rectangle
/// * `height` - Height of the rectangle
/// * `color` - Color of the rectangle
/// * `thickness` - Thickness of the border in pixels, centered on the rectangle outline
pub fn draw_rect(
    img: &mut RgbImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgb<u8>,
    thickness: u32,
) {
    if width == 0 || height == 0 {
        log::warn!(
            "Cannot draw rect with zero dimensions - width: {}, height: {}",
            width,
            height
        );
        return;
    }

    // Layers straddle the outline like OpenCV; even widths put the extra layer outside
    let inner = (thickness.saturating_sub(1) / 2) as i32;
    for offset in -inner..(thickness as i32 - inner) {
        let w = width as i32 + offset * 2;
        let h = height as i32 + offset * 2;
        if w <= 0 || h <= 0 {
            continue;
        }
        let rect = Rect::at(x - offset, y - offset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(img, rect, color);
    }
}

/// Draw every region in its color onto `img`
///
/// Regions and colors are paired by index; the caller keeps both lists the
/// same length.
pub fn draw_regions(img: &mut RgbImage, regions: &[Roi], colors: &[Rgb<u8>], thickness: u32) {
    for (roi, color) in regions.iter().zip(colors) {
        let (x, y, w, h) = roi.to_pixels();
        draw_rect(img, x, y, w, h, *color, thickness);
    }
}

/// Render the preprocessed frame with all tracked regions on top
pub fn render_tracks(
    frame: &GrayImage,
    regions: &[Roi],
    colors: &[Rgb<u8>],
    thickness: u32,
) -> RgbImage {
    let mut canvas = gray_to_rgb(frame);
    draw_regions(&mut canvas, regions, colors, thickness);
    canvas
}
