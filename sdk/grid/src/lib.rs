//! Pixelshare Grids
//!
//! Threshold sharing applied independently to every sample of a raster grid.
//!
//! ```text
//!               split                    any K of N            combine
//!  secret grid ───────▶ share grid 1 ─┐
//!                       share grid 2 ─┼──────────────────────────────▶ secret grid
//!                       share grid N ─┘
//!
//!  secret grid ──downscale──────────────────────────────────────────▶ direct
//!  share grids ──downscale each──▶ combine selected ────────────────▶ reconstructed
//!                                              └── mean absolute error ──┘
//! ```

pub mod codec;
pub mod downscale;
pub mod grid;
pub mod pipeline;

pub use codec::{combine_grids, par_combine_grids, par_split_grid, split_grid};
pub use downscale::{
    DownscaleComparison, compare_downscale, compare_split, downscale, mean_absolute_error,
    par_downscale,
};
pub use grid::{Grid, GridError, ShareGrid};
pub use pipeline::{GridCodec, scheme_from_config};
