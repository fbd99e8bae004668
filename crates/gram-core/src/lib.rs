//! Core library of the gram raster toolkit.
//!
//! - Synthetic imagery: `tile` repeats a tile over a larger canvas, `plan_layout`
//!   spreads patches in a single row over a background, `composite` pastes
//!   patches onto a background (later patches on top, edges cropped).
//! - Rasters: `ndarray` arrays shaped `(rows, cols, bands)`, convertible to and
//!   from canvases, plus terrain/surface models, noise and rotation.
//! - I/O: images (tif/jpg/png) and arrays (txt/npy/json), chosen by extension.
//! - Tasks: `Pipeline` runs a declarative task list, feeding earlier outputs
//!   into later tasks by index.
//!
//! Quick example:
//! ```ignore
//! use image::{DynamicImage, Rgb, RgbImage};
//! use gram_core::prelude::*;
//! # fn main() -> gram_core::Result<()> {
//! let bg = DynamicImage::ImageRgb8(RgbImage::from_pixel(7, 3, Rgb([128, 128, 128])));
//! let dot = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])));
//! let out = composite(&bg, &[dot.clone(), dot.clone(), dot], &Placement::Auto)?;
//! assert_eq!(out.get_pixel(3, 1).0, [255, 0, 0, 255]);
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod geometric;
pub mod io;
pub mod layout;
pub mod model;
pub mod raster;
pub mod surfaces;
pub mod synthetic;
pub mod task;
pub mod tiling;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use geometric::*;
pub use io::*;
pub use layout::*;
pub use model::*;
pub use raster::*;
pub use surfaces::*;
pub use synthetic::*;
pub use task::*;
pub use tiling::*;

/// Convenience prelude for common types and functions.
/// Importing `gram_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::compositing::{composite_onto, paint_rgba, to_rgba};
    pub use crate::config::{Placement, TxtOptions};
    pub use crate::error::{CountDirection, GramError};
    pub use crate::geometric::{resize, rotate};
    pub use crate::io::{FileFormat, load_array, load_image, save_array, save_image};
    pub use crate::layout::plan_layout;
    pub use crate::model::{Canvas, ColorModel, Depth, Extent, Layout, Position, color_model};
    pub use crate::raster::{Raster, from_array, to_array};
    pub use crate::surfaces::{add_gaussian_noise, dsm, dtm, gaussian_noise};
    pub use crate::synthetic::{SynthJob, composite, composite_batch, resolve_layout};
    pub use crate::task::{Output, Pipeline, Task, TaskFile, TaskKind};
    pub use crate::tiling::tile;
}
