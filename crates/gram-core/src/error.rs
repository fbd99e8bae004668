use std::fmt;
use thiserror::Error;

/// Which side of a position/patch count mismatch was larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountDirection {
    MorePositions,
    FewerPositions,
}

impl fmt::Display for CountDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountDirection::MorePositions => f.write_str("More positions than patches"),
            CountDirection::FewerPositions => f.write_str("Fewer positions than patches"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GramError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "Patches too big to fit in the background: need {required_width}x{required_height}, background is {width}x{height}"
    )]
    Fit {
        required_width: u64,
        required_height: u32,
        width: u32,
        height: u32,
    },
    #[error("{direction} ({positions} positions, {patches} patches)")]
    CountMismatch {
        direction: CountDirection,
        positions: usize,
        patches: usize,
    },
    #[error("NPY read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),
    #[error("NPY write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),
    #[error("Filetype not supported: {0:?}")]
    UnsupportedFormat(String),
    #[error("Conversion error: {0}")]
    Conversion(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown task: {0}")]
    UnknownTask(String),
    #[error("Input index {index} does not refer to an earlier task ({available} outputs so far)")]
    InputIndex { index: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, GramError>;
