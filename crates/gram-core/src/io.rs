//! Loading and saving canvases and rasters. The format always follows the
//! file extension.

use crate::config::TxtOptions;
use crate::error::{GramError, Result};
use crate::model::Canvas;
use crate::raster::Raster;
use image::{ColorType, ImageFormat, ImageReader};
use ndarray::{Array3, ArrayD, Axis, Ix3};
use ndarray_npy::{read_npy, write_npy};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// File formats understood by [`load_image`], [`save_image`], [`load_array`]
/// and [`save_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Tiff,
    Jpeg,
    Png,
    /// Delimited text grid, one raster row per line.
    Txt,
    /// NumPy `.npy` of `f64`, 2-D `(rows, cols)` or 3-D `(rows, cols, bands)`.
    Npy,
    /// serde form of the array (`{"v":1,"dim":[..],"data":[..]}`).
    Json,
}

impl FromStr for FileFormat {
    type Err = GramError;
    fn from_str(ext: &str) -> std::result::Result<Self, Self::Err> {
        match ext.to_ascii_lowercase().as_str() {
            "tif" | "tiff" => Ok(Self::Tiff),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "txt" => Ok(Self::Txt),
            "npy" => Ok(Self::Npy),
            "json" => Ok(Self::Json),
            _ => Err(GramError::UnsupportedFormat(ext.to_string())),
        }
    }
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .parse()
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Tiff => Some(ImageFormat::Tiff),
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Png => Some(ImageFormat::Png),
            Self::Txt | Self::Npy | Self::Json => None,
        }
    }
}

fn raster_format(path: &Path) -> Result<ImageFormat> {
    let format = FileFormat::from_path(path)?;
    format
        .image_format()
        .ok_or_else(|| GramError::UnsupportedFormat(format!("{format:?} is not an image format")))
}

/// Decode an image file (`tif`, `jpg` or `png`).
pub fn load_image(path: impl AsRef<Path>) -> Result<Canvas> {
    let path = path.as_ref();
    let format = raster_format(path)?;
    let mut reader = ImageReader::open(path)?;
    reader.set_format(format);
    let img = reader.decode()?;
    debug!(path = %path.display(), w = img.width(), h = img.height(), color = ?img.color(), "loaded image");
    Ok(img)
}

/// Encode `canvas` to `path`.
///
/// JPEG only stores 8-bit grey or RGB and PNG has no float samples; other
/// combinations fail with [`GramError::Conversion`] instead of being
/// converted implicitly.
pub fn save_image(canvas: &Canvas, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = raster_format(path)?;
    let color = canvas.color();
    let encodable = match format {
        ImageFormat::Jpeg => matches!(color, ColorType::L8 | ColorType::Rgb8),
        ImageFormat::Png => !matches!(color, ColorType::Rgb32F | ColorType::Rgba32F),
        _ => true,
    };
    if !encodable {
        return Err(GramError::Conversion(format!(
            "{color:?} samples cannot be written as {format:?}"
        )));
    }
    canvas.save_with_format(path, format)?;
    debug!(path = %path.display(), "saved image");
    Ok(())
}

/// Read a raster from `txt`, `npy` or `json`.
pub fn load_array(path: impl AsRef<Path>, opts: &TxtOptions) -> Result<Raster> {
    let path = path.as_ref();
    match FileFormat::from_path(path)? {
        FileFormat::Txt => {
            opts.validate()?;
            parse_txt(&fs::read_to_string(path)?, opts)
        }
        FileFormat::Npy => {
            let array: ArrayD<f64> = read_npy(path)?;
            let array = match array.ndim() {
                2 => array.insert_axis(Axis(2)),
                3 => array,
                n => {
                    return Err(GramError::Conversion(format!(
                        "expected a 2-D or 3-D array, {} has {n} dimensions",
                        path.display()
                    )));
                }
            };
            array
                .into_dimensionality::<Ix3>()
                .map_err(|e| GramError::Conversion(e.to_string()))
        }
        FileFormat::Json => {
            let reader = BufReader::new(fs::File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        other => Err(GramError::UnsupportedFormat(format!(
            "{other:?} is not an array format"
        ))),
    }
}

/// Write a raster as `txt` (single band only), `npy` or `json`.
///
/// Single-band rasters are stored in `npy` as 2-D `(rows, cols)` arrays.
pub fn save_array(raster: &Raster, path: impl AsRef<Path>, opts: &TxtOptions) -> Result<()> {
    let path = path.as_ref();
    match FileFormat::from_path(path)? {
        FileFormat::Txt => {
            opts.validate()?;
            let (rows, cols, bands) = raster.dim();
            if bands != 1 {
                return Err(GramError::Conversion(format!(
                    "text arrays hold one band, raster has {bands}"
                )));
            }
            let sep = opts.separator();
            let mut w = BufWriter::new(fs::File::create(path)?);
            for r in 0..rows {
                let line = (0..cols)
                    .map(|c| format!("{:.*}", opts.precision, raster[[r, c, 0]]))
                    .collect::<Vec<_>>()
                    .join(&sep);
                writeln!(w, "{line}")?;
            }
            w.flush()?;
        }
        FileFormat::Npy => {
            if raster.dim().2 == 1 {
                write_npy(path, &raster.index_axis(Axis(2), 0).to_owned())?;
            } else {
                write_npy(path, raster)?;
            }
        }
        FileFormat::Json => {
            let mut w = BufWriter::new(fs::File::create(path)?);
            serde_json::to_writer(&mut w, raster)?;
            w.flush()?;
        }
        other => {
            return Err(GramError::UnsupportedFormat(format!(
                "{other:?} is not an array format"
            )));
        }
    }
    debug!(path = %path.display(), "saved array");
    Ok(())
}

fn parse_txt(text: &str, opts: &TxtOptions) -> Result<Raster> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = match opts.delimiter {
            Some(d) => line.split(d).map(str::trim).collect(),
            None => line.split_whitespace().collect(),
        };
        let row = fields
            .iter()
            .map(|f| {
                f.parse::<f64>().map_err(|e| {
                    GramError::InvalidInput(format!("line {}: {f:?}: {e}", n + 1))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(GramError::InvalidInput(format!(
                    "line {}: expected {} columns, found {}",
                    n + 1,
                    first.len(),
                    row.len()
                )));
            }
        }
        rows.push(row);
    }
    let cols = rows.first().map_or(0, Vec::len);
    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Array3::from_shape_vec((rows.len(), cols, 1), data)
        .map_err(|e| GramError::InvalidInput(e.to_string()))
}
