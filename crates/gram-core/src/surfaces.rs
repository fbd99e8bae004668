use crate::error::{GramError, Result};
use crate::raster::Raster;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Terrain model with a constant slope along the columns: every row holds
/// `min_value, min_value + step, min_value + 2 * step, ...`.
pub fn dtm(rows: usize, cols: usize, min_value: f64, slope_step: f64) -> Raster {
    Raster::from_shape_fn((rows, cols, 1), |(_, c, _)| min_value + c as f64 * slope_step)
}

/// Surface model built from a terrain model and a mask of raised features.
///
/// Nonzero cells of `mask` are grouped into 4-connected blobs. Every cell of
/// a blob is set to the highest `dtm` value under that blob plus
/// `delta_height`, so features get flat tops regardless of the slope below.
/// Cells outside the mask keep their terrain height.
pub fn dsm(dtm: &Raster, mask: &Raster, delta_height: f64) -> Result<Raster> {
    let (rows, cols, bands) = dtm.dim();
    if bands != 1 || mask.dim() != (rows, cols, 1) {
        return Err(GramError::InvalidInput(format!(
            "dsm needs single-band rasters of equal size, got {:?} and {:?}",
            dtm.dim(),
            mask.dim()
        )));
    }
    let (labels, count) = label_blobs(mask);

    let mut max_heights = vec![f64::NEG_INFINITY; count];
    for ((r, c), &label) in labels.indexed_iter() {
        if label > 0 {
            let top = &mut max_heights[label - 1];
            *top = top.max(dtm[[r, c, 0]]);
        }
    }

    let mut out = dtm.clone();
    for ((r, c), &label) in labels.indexed_iter() {
        if label > 0 {
            out[[r, c, 0]] = max_heights[label - 1] + delta_height;
        }
    }
    debug!(blobs = count, "raised surface features");
    Ok(out)
}

// Labels start at 1; 0 is background.
fn label_blobs(mask: &Raster) -> (Array2<usize>, usize) {
    let (rows, cols, _) = mask.dim();
    let mut labels = Array2::<usize>::zeros((rows, cols));
    let mut count = 0;
    let mut stack = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if mask[[r, c, 0]] == 0.0 || labels[[r, c]] != 0 {
                continue;
            }
            count += 1;
            labels[[r, c]] = count;
            stack.push((r, c));
            while let Some((r, c)) = stack.pop() {
                let neighbours = [
                    (r.wrapping_sub(1), c),
                    (r + 1, c),
                    (r, c.wrapping_sub(1)),
                    (r, c + 1),
                ];
                for (nr, nc) in neighbours {
                    if nr < rows && nc < cols && mask[[nr, nc, 0]] != 0.0 && labels[[nr, nc]] == 0 {
                        labels[[nr, nc]] = count;
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }
    (labels, count)
}

fn normal(mean: f64, stddev: f64) -> Result<Normal<f64>> {
    if !mean.is_finite() || !stddev.is_finite() {
        return Err(GramError::InvalidInput(format!(
            "noise needs a finite mean and stddev, got mean={mean} stddev={stddev}"
        )));
    }
    Normal::new(mean, stddev)
        .map_err(|e| GramError::InvalidInput(format!("noise stddev {stddev}: {e}")))
}

/// A `(rows, cols, bands)` raster of samples drawn from N(mean, stddev^2).
///
/// The same seed always produces the same raster.
pub fn gaussian_noise(
    shape: (usize, usize, usize),
    mean: f64,
    stddev: f64,
    seed: u64,
) -> Result<Raster> {
    let dist = normal(mean, stddev)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Raster::from_shape_simple_fn(shape, || dist.sample(&mut rng)))
}

/// Add normally distributed noise N(mean, stddev^2) to every sample.
///
/// The same seed always produces the same noise.
pub fn add_gaussian_noise(raster: &Raster, mean: f64, stddev: f64, seed: u64) -> Result<Raster> {
    let dist = normal(mean, stddev)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(raster.mapv(|v| v + dist.sample(&mut rng)))
}
