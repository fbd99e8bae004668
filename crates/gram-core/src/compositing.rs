use crate::model::{Canvas, Position};
use image::{Rgba, RgbaImage};

/// Convert any canvas to 8-bit RGBA. Inputs without alpha become fully opaque.
pub fn to_rgba(canvas: &Canvas) -> RgbaImage {
    canvas.to_rgba8()
}

/// Paint `overlay` onto a copy of `base` with its top-left pixel at `at` and
/// return the result. Both inputs are coerced to RGBA first; the output has
/// the extent of `base`.
///
/// See [`paint_rgba`] for the clipping and alpha rules.
pub fn composite_onto(base: &Canvas, overlay: &Canvas, at: Position) -> RgbaImage {
    let mut out = to_rgba(base);
    paint_rgba(&mut out, &to_rgba(overlay), at);
    out
}

/// Paint `overlay` into `canvas` at `at`, in place.
///
/// - Pixels falling outside `canvas` are dropped; a position partially or
///   entirely off-canvas is not an error.
/// - The overlay's alpha is the mask: 255 replaces the canvas pixel, 0 keeps
///   it, anything in between mixes every channel (alpha included) linearly.
///   Repeated calls therefore resolve opaque overlaps in favour of the most
///   recent overlay.
pub fn paint_rgba(canvas: &mut RgbaImage, overlay: &RgbaImage, at: Position) {
    let (cw, ch) = canvas.dimensions();
    let (ow, oh) = overlay.dimensions();

    let x0 = at.x.max(0);
    let y0 = at.y.max(0);
    let x1 = at.x.saturating_add(ow as i64).min(cw as i64);
    let y1 = at.y.saturating_add(oh as i64).min(ch as i64);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for dy in y0..y1 {
        let sy = (dy - at.y) as u32;
        for dx in x0..x1 {
            let sx = (dx - at.x) as u32;
            let src = overlay.get_pixel(sx, sy);
            match src[3] {
                0 => {}
                255 => canvas.put_pixel(dx as u32, dy as u32, *src),
                a => {
                    let dst = canvas.get_pixel_mut(dx as u32, dy as u32);
                    *dst = mix(src, dst, a);
                }
            }
        }
    }
}

#[inline]
fn mix(top: &Rgba<u8>, bottom: &Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = alpha as u32;
    let mut out = [0u8; 4];
    for (i, o) in out.iter_mut().enumerate() {
        let v = top[i] as u32 * a + bottom[i] as u32 * (255 - a);
        *o = ((v + 127) / 255) as u8;
    }
    Rgba(out)
}
