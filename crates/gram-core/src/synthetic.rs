use crate::compositing::{paint_rgba, to_rgba};
use crate::config::Placement;
use crate::error::{CountDirection, GramError, Result};
use crate::layout::plan_layout;
use crate::model::{Canvas, Extent, Layout};
use image::RgbaImage;
use std::borrow::{Borrow, Cow};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One synthetic image to build: a background, its patches and their placement.
#[derive(Debug, Clone)]
pub struct SynthJob {
    pub background: Canvas,
    pub patches: Vec<Canvas>,
    pub placement: Placement,
}

/// Resolve `placement` into one position per patch.
///
/// `Auto` runs the row planner on the background and patch extents in patch
/// order; explicit positions are checked against the patch count.
pub fn resolve_layout(
    background: Extent,
    patches: &[Extent],
    placement: &Placement,
) -> Result<Layout> {
    let positions = match placement {
        Placement::Auto => plan_layout(background, patches)?,
        Placement::Explicit(v) => v.clone(),
    };
    if positions.len() != patches.len() {
        let direction = if positions.len() > patches.len() {
            CountDirection::MorePositions
        } else {
            CountDirection::FewerPositions
        };
        return Err(GramError::CountMismatch {
            direction,
            positions: positions.len(),
            patches: patches.len(),
        });
    }
    Ok(positions)
}

/// Composite `patches` onto `background` and return an RGBA image with the
/// background's extent.
///
/// Patches are painted in order, so a later opaque patch overwrites an
/// earlier one wherever they overlap. Patches reaching past the background
/// edge are cropped. Neither the background nor the patches are modified.
/// `patches` may hold canvases or references to them.
#[instrument(skip_all, fields(patches = patches.len()))]
pub fn composite<C: Borrow<Canvas>>(
    background: &Canvas,
    patches: &[C],
    placement: &Placement,
) -> Result<RgbaImage> {
    let patches: Vec<&Canvas> = patches.iter().map(<C as Borrow<Canvas>>::borrow).collect();
    let extents: Vec<Extent> = patches.iter().map(|p| Extent::of(*p)).collect();
    let layout = resolve_layout(Extent::of(background), &extents, placement)?;

    let mut synth = to_rgba(background);
    for (&patch, at) in patches.iter().zip(&layout) {
        let rgba: Cow<'_, RgbaImage> = match patch {
            Canvas::ImageRgba8(img) => Cow::Borrowed(img),
            other => Cow::Owned(to_rgba(other)),
        };
        paint_rgba(&mut synth, &rgba, *at);
    }
    debug!(w = synth.width(), h = synth.height(), "composited");
    Ok(synth)
}

/// Build several synthetic images. Jobs are independent; with the `parallel`
/// feature they run on the rayon pool. Results keep the job order.
pub fn composite_batch(jobs: &[SynthJob]) -> Vec<Result<RgbaImage>> {
    let run = |job: &SynthJob| composite(&job.background, &job.patches, &job.placement);
    #[cfg(feature = "parallel")]
    {
        jobs.par_iter().map(run).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        jobs.iter().map(run).collect()
    }
}
