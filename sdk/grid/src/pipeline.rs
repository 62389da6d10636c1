//! Configured grid pipeline
//!
//! Bundles a scheme with the `[grid]` and `[comparison]` settings so callers
//! pick sequential or parallel paths once, at construction.

use pixelshare_config::{PixelshareConfig, SchemeConfig};
use pixelshare_threshold::ThresholdScheme;

use crate::codec::{combine_grids, par_combine_grids, par_split_grid, split_grid};
use crate::downscale::{DownscaleComparison, compare_split, downscale, par_downscale};
use crate::grid::{Grid, GridError, ShareGrid};

/// Build the scheme described by a `[scheme]` config table
pub fn scheme_from_config(config: &SchemeConfig) -> Result<ThresholdScheme, GridError> {
    Ok(ThresholdScheme::new(
        config.threshold,
        config.total_shares,
        config.prime,
    )?)
}

/// A threshold scheme plus how to run it over grids
#[derive(Debug, Clone)]
pub struct GridCodec {
    scheme: ThresholdScheme,
    parallel: bool,
    comparison_shares: Vec<u8>,
}

impl GridCodec {
    /// Parallel codec reconstructing comparisons from shares 1..=K
    pub fn new(scheme: ThresholdScheme) -> Self {
        Self {
            scheme,
            parallel: true,
            comparison_shares: (1..=scheme.threshold() as u8).collect(),
        }
    }

    pub fn from_config(config: &PixelshareConfig) -> Result<Self, GridError> {
        let scheme = scheme_from_config(&config.scheme)?;
        Ok(Self {
            scheme,
            parallel: config.grid.parallel,
            comparison_shares: config.comparison.shares.clone(),
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_comparison_shares(mut self, indices: Vec<u8>) -> Self {
        self.comparison_shares = indices;
        self
    }

    pub fn scheme(&self) -> &ThresholdScheme {
        &self.scheme
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn comparison_shares(&self) -> &[u8] {
        &self.comparison_shares
    }

    /// Split with fresh CSPRNG coefficients
    pub fn split(&self, grid: &Grid) -> Result<Vec<ShareGrid>, GridError> {
        if self.parallel {
            par_split_grid(grid, &self.scheme)
        } else {
            split_grid(grid, &self.scheme, &mut rand::thread_rng())
        }
    }

    pub fn combine(&self, shares: &[ShareGrid]) -> Result<Grid, GridError> {
        if self.parallel {
            par_combine_grids(shares, &self.scheme)
        } else {
            combine_grids(shares, &self.scheme)
        }
    }

    pub fn downscale(&self, grid: &Grid) -> Grid {
        if self.parallel {
            par_downscale(grid, self.scheme.field())
        } else {
            downscale(grid, self.scheme.field())
        }
    }

    /// Run both downscale pipelines on `secret` using the configured share indices
    pub fn compare_downscale(&self, secret: &Grid) -> Result<DownscaleComparison, GridError> {
        let shares = self.split(secret)?;
        compare_split(secret, &shares, &self.scheme, &self.comparison_shares)
    }
}
