use crate::error::{GramError, Result};
use crate::model::{Canvas, Extent};
use image::{ImageBuffer, Pixel, imageops};
use tracing::debug;

/// Build a `target`-sized canvas by repeating `source` edge to edge from the
/// top-left corner. Tiles along the right and bottom edges are cropped. The
/// result keeps the color model of `source`.
///
/// A zero-sized source yields a zeroed canvas of `target`.
pub fn tile(source: &Canvas, target: Extent) -> Result<Canvas> {
    let out = match source {
        Canvas::ImageLuma8(t) => Canvas::ImageLuma8(tile_buffer(t, target)),
        Canvas::ImageLumaA8(t) => Canvas::ImageLumaA8(tile_buffer(t, target)),
        Canvas::ImageRgb8(t) => Canvas::ImageRgb8(tile_buffer(t, target)),
        Canvas::ImageRgba8(t) => Canvas::ImageRgba8(tile_buffer(t, target)),
        Canvas::ImageLuma16(t) => Canvas::ImageLuma16(tile_buffer(t, target)),
        Canvas::ImageLumaA16(t) => Canvas::ImageLumaA16(tile_buffer(t, target)),
        Canvas::ImageRgb16(t) => Canvas::ImageRgb16(tile_buffer(t, target)),
        Canvas::ImageRgba16(t) => Canvas::ImageRgba16(tile_buffer(t, target)),
        Canvas::ImageRgb32F(t) => Canvas::ImageRgb32F(tile_buffer(t, target)),
        Canvas::ImageRgba32F(t) => Canvas::ImageRgba32F(tile_buffer(t, target)),
        other => {
            return Err(GramError::Conversion(format!(
                "cannot tile a canvas of color type {:?}",
                other.color()
            )));
        }
    };
    Ok(out)
}

fn tile_buffer<P: Pixel>(
    tile: &ImageBuffer<P, Vec<P::Subpixel>>,
    target: Extent,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut out = ImageBuffer::new(target.width, target.height);
    let (tw, th) = tile.dimensions();
    if tw == 0 || th == 0 {
        return out;
    }
    let mut count = 0usize;
    for y in (0..target.height).step_by(th as usize) {
        for x in (0..target.width).step_by(tw as usize) {
            imageops::replace(&mut out, tile, x as i64, y as i64);
            count += 1;
        }
    }
    debug!(tiles = count, tw, th, w = target.width, h = target.height, "tiled");
    out
}
