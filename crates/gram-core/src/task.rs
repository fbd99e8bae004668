//! Declarative task lists.
//!
//! A task file names a sequence of operations and their parameters:
//!
//! ```json
//! { "tasks": [
//!     { "task": "data.images.load", "parameters": { "path": "tile.png" } },
//!     { "task": "data.images.tiled", "parameters": { "input_index": [0], "size": [640, 480] } }
//! ] }
//! ```
//!
//! `input_index` wires the outputs of earlier tasks (by position in the list)
//! into the `data` inputs of a task, in the order given.

use crate::config::{Placement, TxtOptions};
use crate::error::{GramError, Result};
use crate::geometric::{resize, rotate};
use crate::io::{load_array, load_image, save_array, save_image};
use crate::layout::plan_layout;
use crate::model::{Canvas, Extent, Layout};
use crate::raster::{Raster, from_array, shape, split, to_array};
use crate::surfaces::{add_gaussian_noise, dsm, dtm, gaussian_noise};
use crate::synthetic::composite;
use crate::tiling::tile;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// A parsed task file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// One entry of a task file. `parameters` stay untyped until the task runs,
/// when they are checked against the parameter set of its [`TaskKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Every operation a task file can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ImageLoad,
    ImageSave,
    ImageFromArray,
    ImageTiled,
    ImageSynthPositions,
    ImageSynthetic,
    ImageResize,
    ImageRotate,
    ArrayAsArray,
    ArrayLoad,
    ArraySave,
    ArraySplit,
    ArrayShape,
    ArrayDtm,
    ArrayDsm,
    ArrayGaussianNoise,
    AddNoise,
}

impl TaskKind {
    pub const ALL: [TaskKind; 17] = [
        TaskKind::ImageLoad,
        TaskKind::ImageSave,
        TaskKind::ImageFromArray,
        TaskKind::ImageTiled,
        TaskKind::ImageSynthPositions,
        TaskKind::ImageSynthetic,
        TaskKind::ImageResize,
        TaskKind::ImageRotate,
        TaskKind::ArrayAsArray,
        TaskKind::ArrayLoad,
        TaskKind::ArraySave,
        TaskKind::ArraySplit,
        TaskKind::ArrayShape,
        TaskKind::ArrayDtm,
        TaskKind::ArrayDsm,
        TaskKind::ArrayGaussianNoise,
        TaskKind::AddNoise,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::ImageLoad => "data.images.load",
            TaskKind::ImageSave => "data.images.save",
            TaskKind::ImageFromArray => "data.images.fromarray",
            TaskKind::ImageTiled => "data.images.tiled",
            TaskKind::ImageSynthPositions => "data.images.synth_positions",
            TaskKind::ImageSynthetic => "data.images.synthetic",
            TaskKind::ImageResize => "data.images.resize",
            TaskKind::ImageRotate => "data.images.rotate",
            TaskKind::ArrayAsArray => "data.arrays.asarray",
            TaskKind::ArrayLoad => "data.arrays.load",
            TaskKind::ArraySave => "data.arrays.save",
            TaskKind::ArraySplit => "data.arrays.split",
            TaskKind::ArrayShape => "data.arrays.shape",
            TaskKind::ArrayDtm => "data.arrays.dtm",
            TaskKind::ArrayDsm => "data.arrays.dsm",
            TaskKind::ArrayGaussianNoise => "data.arrays.gaussian_noise",
            TaskKind::AddNoise => "transformations.arithmetic.add_noise",
        }
    }
}

impl FromStr for TaskKind {
    type Err = GramError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| GramError::UnknownTask(s.to_string()))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a task, available to later tasks through `input_index`.
#[derive(Debug, Clone)]
pub enum Output {
    Canvas(Canvas),
    Raster(Raster),
    Layout(Layout),
    Shape([usize; 3]),
    Saved(PathBuf),
}

impl Output {
    pub fn kind(&self) -> &'static str {
        match self {
            Output::Canvas(_) => "canvas",
            Output::Raster(_) => "raster",
            Output::Layout(_) => "layout",
            Output::Shape(_) => "shape",
            Output::Saved(_) => "saved",
        }
    }

    pub fn as_canvas(&self) -> Option<&Canvas> {
        match self {
            Output::Canvas(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_raster(&self) -> Option<&Raster> {
        match self {
            Output::Raster(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_layout(&self) -> Option<&Layout> {
        match self {
            Output::Layout(l) => Some(l),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoParams {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PathParams {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArrayPathParams {
    path: PathBuf,
    #[serde(default)]
    delimiter: Option<char>,
    #[serde(default)]
    precision: Option<usize>,
}

impl ArrayPathParams {
    fn txt_options(&self) -> TxtOptions {
        let opts = TxtOptions {
            delimiter: self.delimiter,
            ..Default::default()
        };
        match self.precision {
            Some(p) => opts.precision(p),
            None => opts,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TiledParams {
    /// `[width, height]`
    size: [u32; 2],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SyntheticParams {
    #[serde(default)]
    positions: Placement,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ResizeParams {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RotateParams {
    /// Counter-clockwise, in degrees.
    angle: f64,
    #[serde(default)]
    expand: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SplitParams {
    layer: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DtmParams {
    /// `[rows, cols]`
    size: [usize; 2],
    #[serde(default)]
    min_value: f64,
    slope_step: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DsmParams {
    delta_height: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoiseShapeParams {
    /// `[rows, cols]` or `[rows, cols, bands]`
    shape: Vec<usize>,
    #[serde(default)]
    mean: f64,
    stddev: f64,
    #[serde(default)]
    seed: u64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoiseParams {
    #[serde(default)]
    mean: f64,
    stddev: f64,
    #[serde(default)]
    seed: u64,
}

fn params<T: DeserializeOwned>(kind: TaskKind, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| GramError::InvalidInput(format!("{kind}: bad parameters: {e}")))
}

fn canvas<'a>(kind: TaskKind, data: &[&'a Output], i: usize) -> Result<&'a Canvas> {
    let out: &'a Output = data
        .get(i)
        .copied()
        .ok_or_else(|| GramError::InvalidInput(format!("{kind}: missing input {i}")))?;
    out.as_canvas().ok_or_else(|| {
        GramError::InvalidInput(format!("{kind}: input {i} is a {}, expected a canvas", out.kind()))
    })
}

fn raster<'a>(kind: TaskKind, data: &[&'a Output], i: usize) -> Result<&'a Raster> {
    let out: &'a Output = data
        .get(i)
        .copied()
        .ok_or_else(|| GramError::InvalidInput(format!("{kind}: missing input {i}")))?;
    out.as_raster().ok_or_else(|| {
        GramError::InvalidInput(format!("{kind}: input {i} is a {}, expected a raster", out.kind()))
    })
}

fn canvases<'a>(kind: TaskKind, data: &[&'a Output]) -> Result<Vec<&'a Canvas>> {
    (0..data.len()).map(|i| canvas(kind, data, i)).collect()
}

/// Run one operation on already resolved inputs.
///
/// `parameters` must not contain `input_index`; [`Pipeline::run_task`] strips
/// it after resolving `data`.
pub fn execute(kind: TaskKind, parameters: serde_json::Value, data: &[&Output]) -> Result<Output> {
    let out = match kind {
        TaskKind::ImageLoad => {
            let p: PathParams = params(kind, parameters)?;
            Output::Canvas(load_image(&p.path)?)
        }
        TaskKind::ImageSave => {
            let p: PathParams = params(kind, parameters)?;
            save_image(canvas(kind, data, 0)?, &p.path)?;
            Output::Saved(p.path)
        }
        TaskKind::ImageFromArray => {
            let _: NoParams = params(kind, parameters)?;
            Output::Canvas(from_array(raster(kind, data, 0)?)?)
        }
        TaskKind::ImageTiled => {
            let p: TiledParams = params(kind, parameters)?;
            let [w, h] = p.size;
            Output::Canvas(tile(canvas(kind, data, 0)?, Extent::new(w, h))?)
        }
        TaskKind::ImageSynthPositions => {
            let _: NoParams = params(kind, parameters)?;
            let all = canvases(kind, data)?;
            let (background, patches) = all
                .split_first()
                .ok_or_else(|| GramError::InvalidInput(format!("{kind}: missing background")))?;
            let extents: Vec<Extent> = patches.iter().map(|c| Extent::of(*c)).collect();
            Output::Layout(plan_layout(Extent::of(*background), &extents)?)
        }
        TaskKind::ImageSynthetic => {
            let p: SyntheticParams = params(kind, parameters)?;
            let all = canvases(kind, data)?;
            let (background, patches) = all
                .split_first()
                .ok_or_else(|| GramError::InvalidInput(format!("{kind}: missing background")))?;
            Output::Canvas(Canvas::ImageRgba8(composite(background, patches, &p.positions)?))
        }
        TaskKind::ImageResize => {
            let p: ResizeParams = params(kind, parameters)?;
            Output::Canvas(resize(canvas(kind, data, 0)?, Extent::new(p.width, p.height))?)
        }
        TaskKind::ImageRotate => {
            let p: RotateParams = params(kind, parameters)?;
            Output::Canvas(rotate(canvas(kind, data, 0)?, p.angle, p.expand)?)
        }
        TaskKind::ArrayAsArray => {
            let _: NoParams = params(kind, parameters)?;
            Output::Raster(to_array(canvas(kind, data, 0)?)?)
        }
        TaskKind::ArrayLoad => {
            let p: ArrayPathParams = params(kind, parameters)?;
            Output::Raster(load_array(&p.path, &p.txt_options())?)
        }
        TaskKind::ArraySave => {
            let p: ArrayPathParams = params(kind, parameters)?;
            save_array(raster(kind, data, 0)?, &p.path, &p.txt_options())?;
            Output::Saved(p.path)
        }
        TaskKind::ArraySplit => {
            let p: SplitParams = params(kind, parameters)?;
            Output::Raster(split(raster(kind, data, 0)?, p.layer)?)
        }
        TaskKind::ArrayShape => {
            let _: NoParams = params(kind, parameters)?;
            Output::Shape(shape(raster(kind, data, 0)?))
        }
        TaskKind::ArrayDtm => {
            let p: DtmParams = params(kind, parameters)?;
            let [rows, cols] = p.size;
            Output::Raster(dtm(rows, cols, p.min_value, p.slope_step))
        }
        TaskKind::ArrayDsm => {
            let p: DsmParams = params(kind, parameters)?;
            Output::Raster(dsm(raster(kind, data, 0)?, raster(kind, data, 1)?, p.delta_height)?)
        }
        TaskKind::ArrayGaussianNoise => {
            let p: NoiseShapeParams = params(kind, parameters)?;
            let shape = match p.shape[..] {
                [rows, cols] => (rows, cols, 1),
                [rows, cols, bands] => (rows, cols, bands),
                _ => {
                    return Err(GramError::InvalidInput(format!(
                        "{kind}: shape must be [rows, cols] or [rows, cols, bands], got {:?}",
                        p.shape
                    )));
                }
            };
            Output::Raster(gaussian_noise(shape, p.mean, p.stddev, p.seed)?)
        }
        TaskKind::AddNoise => {
            let p: NoiseParams = params(kind, parameters)?;
            Output::Raster(add_gaussian_noise(raster(kind, data, 0)?, p.mean, p.stddev, p.seed)?)
        }
    };
    Ok(out)
}

/// Runs tasks in order, keeping every output so later tasks can consume it.
#[derive(Debug, Default)]
pub struct Pipeline {
    outputs: Vec<Output>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<Output> {
        self.outputs
    }

    /// Resolve the inputs of `task`, run it and append its output.
    #[instrument(skip_all, fields(index = self.outputs.len(), task = %task.task))]
    pub fn run_task(&mut self, task: &Task) -> Result<&Output> {
        let kind: TaskKind = task.task.parse()?;
        let mut parameters = match &task.parameters {
            serde_json::Value::Null => serde_json::Map::new(),
            serde_json::Value::Object(m) => m.clone(),
            other => {
                return Err(GramError::InvalidInput(format!(
                    "{kind}: parameters must be an object, got {other}"
                )));
            }
        };
        let indices: Vec<usize> = match parameters.remove("input_index") {
            Some(v) => params(kind, v)?,
            None => Vec::new(),
        };
        let data = indices
            .iter()
            .map(|&index| {
                self.outputs.get(index).ok_or(GramError::InputIndex {
                    index,
                    available: self.outputs.len(),
                })
            })
            .collect::<Result<Vec<&Output>>>()?;

        info!("executing {kind}");
        debug!(?indices, "inputs");
        let out = execute(kind, serde_json::Value::Object(parameters), &data)?;
        debug!(output = out.kind(), "task done");
        self.outputs.push(out);
        Ok(&self.outputs[self.outputs.len() - 1])
    }

    /// Run every task of `file`, stopping at the first failure.
    pub fn run_all(&mut self, file: &TaskFile) -> Result<()> {
        if file.tasks.is_empty() {
            warn!("task list is empty, nothing to do");
        }
        for task in &file.tasks {
            self.run_task(task)?;
        }
        Ok(())
    }
}
