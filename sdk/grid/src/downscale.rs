//! 2×2 block averaging and the share-domain comparison
//!
//! `downscale` maps each 2×2 block `(a, b, c, d)` to
//! `round((a + b + c + d) / 4) mod p`. The division is real-valued rather than
//! a field division, so it does not commute exactly with reconstruction:
//! downscaling each share and reconstructing gives a grid close to, but in
//! general not equal to, the directly downscaled secret. [`compare_downscale`]
//! measures the gap.

use pixelshare_threshold::{CoefficientSource, PrimeField, ThresholdError, ThresholdScheme};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::codec::{combine_grids, split_grid};
use crate::grid::{Grid, GridError, ShareGrid};

/// Halve both dimensions by averaging 2×2 blocks.
///
/// An odd trailing row or column is dropped. Every output sample lies in `[0, p)`.
pub fn downscale(grid: &Grid, field: &PrimeField) -> Grid {
    let (width, height) = (grid.width() / 2, grid.height() / 2);
    let mut out = Grid::new(width, height);

    for (y, row) in out.samples_mut().chunks_exact_mut(width.max(1)).enumerate() {
        downscale_row(grid, field, y, row);
    }

    out
}

/// [`downscale`] across rayon workers, one output row each
pub fn par_downscale(grid: &Grid, field: &PrimeField) -> Grid {
    let (width, height) = (grid.width() / 2, grid.height() / 2);
    let mut out = Grid::new(width, height);

    out.samples_mut()
        .par_chunks_exact_mut(width.max(1))
        .enumerate()
        .for_each(|(y, row)| downscale_row(grid, field, y, row));

    out
}

fn downscale_row(grid: &Grid, field: &PrimeField, y: usize, row: &mut [u8]) {
    let w = grid.width();
    let top = &grid.samples()[2 * y * w..];
    let bottom = &grid.samples()[(2 * y + 1) * w..];

    for (x, slot) in row.iter_mut().enumerate() {
        let sum = top[2 * x] as u32
            + top[2 * x + 1] as u32
            + bottom[2 * x] as u32
            + bottom[2 * x + 1] as u32;
        // round half up
        *slot = field.reduce((sum + 2) / 4);
    }
}

/// Mean of |a_i - b_i| over all sample positions
pub fn mean_absolute_error(a: &Grid, b: &Grid) -> Result<f64, GridError> {
    a.check_same_dimensions(b)?;
    if a.is_empty() {
        return Ok(0.0);
    }

    let total: u64 = a
        .samples()
        .iter()
        .zip(b.samples())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();

    Ok(total as f64 / a.len() as f64)
}

/// Outcome of running both downscale pipelines on one secret grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownscaleComparison {
    /// The secret grid downscaled directly
    pub direct: Grid,
    /// Every share grid, downscaled
    pub downscaled_shares: Vec<ShareGrid>,
    /// Reconstructed from the selected downscaled shares
    pub reconstructed: Grid,
    /// Share indices the reconstruction used
    pub indices: Vec<u8>,
    /// Mean absolute difference between `direct` and `reconstructed`
    pub mean_absolute_error: f64,
}

/// Compare "downscale the secret" against "split, downscale every share,
/// reconstruct from `indices`".
pub fn compare_downscale<S>(
    secret: &Grid,
    scheme: &ThresholdScheme,
    source: &mut S,
    indices: &[u8],
) -> Result<DownscaleComparison, GridError>
where
    S: CoefficientSource + ?Sized,
{
    let shares = split_grid(secret, scheme, source)?;
    compare_split(secret, &shares, scheme, indices)
}

/// Second half of [`compare_downscale`], for shares the caller already has
pub fn compare_split(
    secret: &Grid,
    shares: &[ShareGrid],
    scheme: &ThresholdScheme,
    indices: &[u8],
) -> Result<DownscaleComparison, GridError> {
    let field = scheme.field();
    let direct = downscale(secret, field);

    let downscaled_shares: Vec<ShareGrid> = shares
        .iter()
        .map(|s| ShareGrid::new(s.index, downscale(&s.grid, field)))
        .collect();

    let selected = indices
        .iter()
        .map(|&x| {
            downscaled_shares
                .iter()
                .find(|s| s.index == x)
                .cloned()
                .ok_or(ThresholdError::ShareIndexOutOfRange {
                    x,
                    n: scheme.total_shares(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let reconstructed = combine_grids(&selected, scheme)?;
    let mean_absolute_error = mean_absolute_error(&direct, &reconstructed)?;

    log::info!(
        "Downscale comparison over shares {:?}: MAE {:.4}",
        indices,
        mean_absolute_error
    );

    Ok(DownscaleComparison {
        direct,
        downscaled_shares,
        reconstructed,
        indices: indices.to_vec(),
        mean_absolute_error,
    })
}
