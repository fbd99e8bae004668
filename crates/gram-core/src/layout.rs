use crate::error::{GramError, Result};
use crate::model::{Extent, Layout, Position};
use tracing::debug;

/// Place `patches` in a single horizontal row on a `background`, in input
/// order, maximizing the gap around each patch.
///
/// - The horizontal slack `W - sum(widths)` is split into `n + 1` equal gaps
///   (floor division): one before every patch and one after the last.
/// - All patches share one y coordinate, `floor((H - max_height) / 2)`, so
///   they are top-aligned inside a vertically centered band.
///
/// This is a row heuristic and never stacks patches vertically.
///
/// Returns [`GramError::Fit`] when the summed widths exceed the background
/// width or the tallest patch exceeds its height. An empty patch list gives an
/// empty layout.
pub fn plan_layout(background: Extent, patches: &[Extent]) -> Result<Layout> {
    if patches.is_empty() {
        return Ok(Vec::new());
    }

    let total_width: u64 = patches.iter().map(|p| p.width as u64).sum();
    let max_height = patches.iter().map(|p| p.height).max().unwrap_or(0);

    if total_width > background.width as u64 || max_height > background.height {
        return Err(GramError::Fit {
            required_width: total_width,
            required_height: max_height,
            width: background.width,
            height: background.height,
        });
    }

    let width_buffer = (background.width as u64 - total_width) / (patches.len() as u64 + 1);
    let height_buffer = (background.height - max_height) / 2;

    let mut cursor = 0i64;
    let layout: Layout = patches
        .iter()
        .map(|p| {
            let x = cursor + width_buffer as i64;
            cursor = x + p.width as i64;
            Position::new(x, height_buffer as i64)
        })
        .collect();

    debug!(
        patches = patches.len(),
        width_buffer, height_buffer, "planned row layout"
    );
    Ok(layout)
}
