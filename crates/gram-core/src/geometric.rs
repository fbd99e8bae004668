use crate::error::{GramError, Result};
use crate::model::{Canvas, Extent};
use image::imageops::FilterType;
use image::{ImageBuffer, Pixel};
use tracing::debug;

/// Resample `canvas` to exactly `target` with nearest-neighbour sampling.
pub fn resize(canvas: &Canvas, target: Extent) -> Result<Canvas> {
    if target.is_empty() {
        return Err(GramError::InvalidInput(format!(
            "cannot resize to {}x{}",
            target.width, target.height
        )));
    }
    Ok(canvas.resize_exact(target.width, target.height, FilterType::Nearest))
}

/// Rotate `canvas` counter-clockwise by `degrees` around its centre with
/// nearest-neighbour sampling.
///
/// With `expand` the output grows to hold the whole rotated canvas; otherwise
/// it keeps the input extent and the corners are cropped. Uncovered pixels
/// are zero (transparent where the canvas has alpha).
pub fn rotate(canvas: &Canvas, degrees: f64, expand: bool) -> Result<Canvas> {
    if !degrees.is_finite() {
        return Err(GramError::InvalidInput(format!("rotation angle {degrees}")));
    }
    let out = match canvas {
        Canvas::ImageLuma8(b) => Canvas::ImageLuma8(rotate_buffer(b, degrees, expand)),
        Canvas::ImageLumaA8(b) => Canvas::ImageLumaA8(rotate_buffer(b, degrees, expand)),
        Canvas::ImageRgb8(b) => Canvas::ImageRgb8(rotate_buffer(b, degrees, expand)),
        Canvas::ImageRgba8(b) => Canvas::ImageRgba8(rotate_buffer(b, degrees, expand)),
        Canvas::ImageLuma16(b) => Canvas::ImageLuma16(rotate_buffer(b, degrees, expand)),
        Canvas::ImageLumaA16(b) => Canvas::ImageLumaA16(rotate_buffer(b, degrees, expand)),
        Canvas::ImageRgb16(b) => Canvas::ImageRgb16(rotate_buffer(b, degrees, expand)),
        Canvas::ImageRgba16(b) => Canvas::ImageRgba16(rotate_buffer(b, degrees, expand)),
        Canvas::ImageRgb32F(b) => Canvas::ImageRgb32F(rotate_buffer(b, degrees, expand)),
        Canvas::ImageRgba32F(b) => Canvas::ImageRgba32F(rotate_buffer(b, degrees, expand)),
        other => {
            return Err(GramError::Conversion(format!(
                "cannot rotate a canvas of color type {:?}",
                other.color()
            )));
        }
    };
    debug!(degrees, expand, w = out.width(), h = out.height(), "rotated");
    Ok(out)
}

// Slack for trig round-off, so quarter turns give exact extents.
const EPS: f64 = 1e-9;

fn rotate_buffer<P: Pixel>(
    src: &ImageBuffer<P, Vec<P::Subpixel>>,
    degrees: f64,
    expand: bool,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (sw, sh) = src.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = if expand {
        let (fw, fh) = (sw as f64, sh as f64);
        let ew = fw * cos.abs() + fh * sin.abs();
        let eh = fw * sin.abs() + fh * cos.abs();
        ((ew - EPS).ceil().max(0.0) as u32, (eh - EPS).ceil().max(0.0) as u32)
    } else {
        (sw, sh)
    };

    let mut out = ImageBuffer::new(w, h);
    let (scx, scy) = (sw as f64 / 2.0, sh as f64 / 2.0);
    let (ocx, ocy) = (w as f64 / 2.0, h as f64 / 2.0);
    for (x, y, px) in out.enumerate_pixels_mut() {
        // Map the output pixel centre back into the source; y grows downward.
        let dx = x as f64 + 0.5 - ocx;
        let dy = y as f64 + 0.5 - ocy;
        let sx = (dx * cos - dy * sin + scx).floor();
        let sy = (dx * sin + dy * cos + scy).floor();
        if sx >= 0.0 && sy >= 0.0 && sx < sw as f64 && sy < sh as f64 {
            *px = *src.get_pixel(sx as u32, sy as u32);
        }
    }
    out
}
