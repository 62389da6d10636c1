//! Sample grid codec
//!
//! Applies the threshold scheme independently to every sample of a grid.
//! Splitting scatters the i-th share value of each sample into the i-th
//! output grid. Combining gathers one value per input grid at each position
//! and interpolates.
//!
//! Samples never depend on each other, so the `par_` variants spread the work
//! across rayon workers. Each worker owns a disjoint slice of the output.

use pixelshare_threshold::{CoefficientSource, ThresholdScheme};
use rayon::prelude::*;

use crate::grid::{Grid, GridError, ShareGrid};

/// Split `grid` into N share grids, drawing coefficients from `source`.
///
/// Sequential: a seeded `source` gives reproducible shares.
pub fn split_grid<S>(
    grid: &Grid,
    scheme: &ThresholdScheme,
    source: &mut S,
) -> Result<Vec<ShareGrid>, GridError>
where
    S: CoefficientSource + ?Sized,
{
    log::debug!(
        "Splitting {}x{} grid into {} shares",
        grid.width(),
        grid.height(),
        scheme.total_shares()
    );

    let mut shares = empty_shares(grid, scheme);

    for (idx, &secret) in grid.samples().iter().enumerate() {
        let points = scheme.generate_shares(secret, source)?;
        for (share, point) in shares.iter_mut().zip(points) {
            share.grid.samples_mut()[idx] = point.y;
        }
    }

    Ok(shares)
}

/// Split `grid` into N share grids across rayon workers.
///
/// Every worker draws from its own thread-local CSPRNG.
pub fn par_split_grid(
    grid: &Grid,
    scheme: &ThresholdScheme,
) -> Result<Vec<ShareGrid>, GridError> {
    log::debug!(
        "Splitting {}x{} grid into {} shares (parallel)",
        grid.width(),
        grid.height(),
        scheme.total_shares()
    );

    let n = scheme.total_shares();

    // Sample-major: the N share values of sample i sit at [i*N, (i+1)*N)
    let mut interleaved = vec![0u8; grid.len() * n];
    interleaved
        .par_chunks_mut(n)
        .zip(grid.samples().par_iter())
        .try_for_each_init(rand::thread_rng, |rng, (slots, &secret)| {
            let points = scheme.generate_shares(secret, rng)?;
            for (slot, point) in slots.iter_mut().zip(points) {
                *slot = point.y;
            }
            Ok::<(), GridError>(())
        })?;

    let mut shares = empty_shares(grid, scheme);
    for (i, share) in shares.iter_mut().enumerate() {
        for (dst, src) in share
            .grid
            .samples_mut()
            .iter_mut()
            .zip(interleaved.iter().skip(i).step_by(n))
        {
            *dst = *src;
        }
    }

    Ok(shares)
}

/// Reconstruct the secret grid from K or more share grids.
///
/// Validates the index set and the dimensions before writing anything. The
/// Lagrange weights depend only on the indices, so they are computed once and
/// reused at every position.
pub fn combine_grids(shares: &[ShareGrid], scheme: &ThresholdScheme) -> Result<Grid, GridError> {
    let (weights, (width, height)) = prepare_combine(shares, scheme)?;

    let mut out = Grid::new(width, height);
    let mut ys = Vec::with_capacity(shares.len());
    for (idx, slot) in out.samples_mut().iter_mut().enumerate() {
        ys.clear();
        ys.extend(shares.iter().map(|s| s.grid.samples()[idx]));
        *slot = scheme.combine_weighted(&weights, &ys);
    }

    Ok(out)
}

/// [`combine_grids`] across rayon workers
pub fn par_combine_grids(
    shares: &[ShareGrid],
    scheme: &ThresholdScheme,
) -> Result<Grid, GridError> {
    let (weights, (width, height)) = prepare_combine(shares, scheme)?;

    let mut out = Grid::new(width, height);
    out.samples_mut().par_iter_mut().enumerate().for_each_init(
        || Vec::with_capacity(shares.len()),
        |ys, (idx, slot)| {
            ys.clear();
            ys.extend(shares.iter().map(|s| s.grid.samples()[idx]));
            *slot = scheme.combine_weighted(&weights, ys);
        },
    );

    Ok(out)
}

fn empty_shares(grid: &Grid, scheme: &ThresholdScheme) -> Vec<ShareGrid> {
    (1..=scheme.total_shares() as u8)
        .map(|x| ShareGrid::new(x, Grid::new(grid.width(), grid.height())))
        .collect()
}

fn prepare_combine(
    shares: &[ShareGrid],
    scheme: &ThresholdScheme,
) -> Result<(Vec<u8>, (usize, usize)), GridError> {
    let xs: Vec<u8> = shares.iter().map(|s| s.index).collect();
    let weights = scheme.lagrange_weights(&xs)?;

    // lagrange_weights rejects an empty set, so shares[0] exists
    let first = &shares[0].grid;
    for share in &shares[1..] {
        first.check_same_dimensions(&share.grid)?;
    }

    log::debug!(
        "Combining {} shares {:?} into {}x{} grid",
        shares.len(),
        xs,
        first.width(),
        first.height()
    );

    Ok((weights, first.dimensions()))
}
