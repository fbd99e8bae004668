//! Numeric arrays and their conversion to and from canvases.
//!
//! A [`Raster`] is shaped `(rows, cols, bands)`; row 0 is the top of the
//! image and bands follow the canvas channel order (grey, grey+alpha, RGB,
//! RGBA).

use crate::error::{GramError, Result};
use crate::model::{Canvas, ColorModel};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use ndarray::{Array3, s};

pub type Raster = Array3<f64>;

/// Widen every sample of `canvas` to `f64`.
pub fn to_array(canvas: &Canvas) -> Result<Raster> {
    match canvas {
        Canvas::ImageLuma8(b) => buffer_to_array(b),
        Canvas::ImageLumaA8(b) => buffer_to_array(b),
        Canvas::ImageRgb8(b) => buffer_to_array(b),
        Canvas::ImageRgba8(b) => buffer_to_array(b),
        Canvas::ImageLuma16(b) => buffer_to_array(b),
        Canvas::ImageLumaA16(b) => buffer_to_array(b),
        Canvas::ImageRgb16(b) => buffer_to_array(b),
        Canvas::ImageRgba16(b) => buffer_to_array(b),
        Canvas::ImageRgb32F(b) => buffer_to_array(b),
        Canvas::ImageRgba32F(b) => buffer_to_array(b),
        other => Err(GramError::Conversion(format!(
            "unsupported color type {:?}",
            other.color()
        ))),
    }
}

fn buffer_to_array<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<Raster>
where
    P: Pixel,
    P::Subpixel: Into<f64>,
{
    let (w, h) = buf.dimensions();
    let data: Vec<f64> = buf.as_raw().iter().map(|&v| v.into()).collect();
    Array3::from_shape_vec((h as usize, w as usize, P::CHANNEL_COUNT as usize), data)
        .map_err(|e| GramError::Conversion(e.to_string()))
}

/// Build a canvas from `raster`, picking the narrowest sample type that holds
/// the data exactly.
///
/// - Integral values in `0..=255` give an 8-bit canvas, in `0..=65535` a
///   16-bit canvas.
/// - Anything else is only representable as 32-bit float RGB or RGBA; grey
///   rasters with such values fail with [`GramError::Conversion`] rather than
///   being rounded.
pub fn from_array(raster: &Raster) -> Result<Canvas> {
    let (rows, cols, bands) = raster.dim();
    let model = ColorModel::from_channels(bands)
        .ok_or_else(|| GramError::Conversion(format!("{bands} bands cannot form a canvas")))?;
    let w = u32::try_from(cols).map_err(|_| GramError::Conversion("too many columns".into()))?;
    let h = u32::try_from(rows).map_err(|_| GramError::Conversion("too many rows".into()))?;

    let integral = raster.iter().all(|v| v.is_finite() && v.fract() == 0.0);
    let (min, max) = raster
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let non_negative = raster.is_empty() || min >= 0.0;

    if integral && non_negative && (raster.is_empty() || max <= u8::MAX as f64) {
        let data: Vec<u8> = raster.iter().map(|&v| v as u8).collect();
        return Ok(match model {
            ColorModel::Grey => Canvas::ImageLuma8(assemble::<Luma<u8>>(w, h, data)?),
            ColorModel::GreyAlpha => Canvas::ImageLumaA8(assemble::<LumaA<u8>>(w, h, data)?),
            ColorModel::Rgb => Canvas::ImageRgb8(assemble::<Rgb<u8>>(w, h, data)?),
            ColorModel::Rgba => Canvas::ImageRgba8(assemble::<Rgba<u8>>(w, h, data)?),
        });
    }
    if integral && non_negative && max <= u16::MAX as f64 {
        let data: Vec<u16> = raster.iter().map(|&v| v as u16).collect();
        return Ok(match model {
            ColorModel::Grey => Canvas::ImageLuma16(assemble::<Luma<u16>>(w, h, data)?),
            ColorModel::GreyAlpha => Canvas::ImageLumaA16(assemble::<LumaA<u16>>(w, h, data)?),
            ColorModel::Rgb => Canvas::ImageRgb16(assemble::<Rgb<u16>>(w, h, data)?),
            ColorModel::Rgba => Canvas::ImageRgba16(assemble::<Rgba<u16>>(w, h, data)?),
        });
    }

    let data: Vec<f32> = raster.iter().map(|&v| v as f32).collect();
    match model {
        ColorModel::Rgb => Ok(Canvas::ImageRgb32F(assemble::<Rgb<f32>>(w, h, data)?)),
        ColorModel::Rgba => Ok(Canvas::ImageRgba32F(assemble::<Rgba<f32>>(w, h, data)?)),
        ColorModel::Grey | ColorModel::GreyAlpha => Err(GramError::Conversion(format!(
            "{bands}-band raster with values in [{min}, {max}] needs explicit rounding or scaling to fit 8 or 16 bit samples"
        ))),
    }
}

fn assemble<P: Pixel>(w: u32, h: u32, data: Vec<P::Subpixel>) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    ImageBuffer::from_raw(w, h, data)
        .ok_or_else(|| GramError::Conversion(format!("sample count does not match {w}x{h}")))
}

/// Extract one band as a `(rows, cols, 1)` raster.
pub fn split(raster: &Raster, band: usize) -> Result<Raster> {
    let bands = raster.dim().2;
    if band >= bands {
        return Err(GramError::InvalidInput(format!(
            "band {band} out of range for a {bands}-band raster"
        )));
    }
    Ok(raster.slice(s![.., .., band..band + 1]).to_owned())
}

/// `[rows, cols, bands]`.
pub fn shape(raster: &Raster) -> [usize; 3] {
    let (r, c, b) = raster.dim();
    [r, c, b]
}
