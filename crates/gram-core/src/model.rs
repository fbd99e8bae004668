use image::{ColorType, DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

/// A raster image with its color model. Grey, grey+alpha, RGB and RGBA are
/// supported in 8-bit, 16-bit and (RGB/RGBA only) 32-bit float depths.
pub type Canvas = DynamicImage;

/// Size of a canvas in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent of an existing canvas (or any image view).
    pub fn of<I: GenericImageView>(img: &I) -> Self {
        let (width, height) = img.dimensions();
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Extent {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Top-left pixel of a patch within the background frame. `(0, 0)` is the top
/// left corner; `x` grows rightward and `y` downward. Negative values are
/// allowed and are cropped on paste.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<[i64; 2]> for Position {
    fn from([x, y]: [i64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [i64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl From<(i64, i64)> for Position {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// One position per patch, in patch order.
pub type Layout = Vec<Position>;

/// Channel layout of a canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    Grey,
    GreyAlpha,
    Rgb,
    Rgba,
}

impl ColorModel {
    pub fn channels(self) -> usize {
        match self {
            ColorModel::Grey => 1,
            ColorModel::GreyAlpha => 2,
            ColorModel::Rgb => 3,
            ColorModel::Rgba => 4,
        }
    }

    pub fn from_channels(n: usize) -> Option<Self> {
        match n {
            1 => Some(ColorModel::Grey),
            2 => Some(ColorModel::GreyAlpha),
            3 => Some(ColorModel::Rgb),
            4 => Some(ColorModel::Rgba),
            _ => None,
        }
    }
}

/// Sample type of a canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    U8,
    U16,
    F32,
}

/// Color model and sample depth of `canvas`, or `None` for color types this
/// crate does not handle.
pub fn color_model(canvas: &Canvas) -> Option<(ColorModel, Depth)> {
    let out = match canvas.color() {
        ColorType::L8 => (ColorModel::Grey, Depth::U8),
        ColorType::La8 => (ColorModel::GreyAlpha, Depth::U8),
        ColorType::Rgb8 => (ColorModel::Rgb, Depth::U8),
        ColorType::Rgba8 => (ColorModel::Rgba, Depth::U8),
        ColorType::L16 => (ColorModel::Grey, Depth::U16),
        ColorType::La16 => (ColorModel::GreyAlpha, Depth::U16),
        ColorType::Rgb16 => (ColorModel::Rgb, Depth::U16),
        ColorType::Rgba16 => (ColorModel::Rgba, Depth::U16),
        ColorType::Rgb32F => (ColorModel::Rgb, Depth::F32),
        ColorType::Rgba32F => (ColorModel::Rgba, Depth::F32),
        _ => return None,
    };
    Some(out)
}
