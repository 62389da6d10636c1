//! Sample grids
//!
//! A [`Grid`] is a row-major width×height buffer of one-byte samples. Decoding
//! and encoding raster files is left to the caller; grids only carry numbers.

use pixelshare_threshold::ThresholdError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("sample count mismatch: expected {expected}, found {found}")]
    SampleCount { expected: usize, found: usize },

    #[error("({x}, {y}) outside {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

/// A row-major 2D array of samples
///
/// Deserialization goes through [`Grid::from_samples`], so a stored grid whose
/// sample count disagrees with its dimensions is rejected on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

/// Wire form of [`Grid`] before the length check
#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Grid::from_samples(raw.width, raw.height, raw.samples)
    }
}

impl Grid {
    /// An all-zero grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            samples: vec![0; width * height],
        }
    }

    /// Wrap a row-major sample buffer
    pub fn from_samples(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, GridError> {
        let expected = width.checked_mul(height).unwrap_or(usize::MAX);
        if samples.len() != expected {
            return Err(GridError::SampleCount {
                expected,
                found: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build from rows, which must all have the same length
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());

        let mut samples = Vec::with_capacity(width * height);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(GridError::SampleCount {
                    expected: width,
                    found: row.len(),
                });
            }
            samples.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.samples[y * self.width + x])
    }

    /// Overwrite the sample at column `x`, row `y`
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> Result<(), GridError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.samples[y * self.width + x] = value;
        Ok(())
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        Some(&self.samples[y * self.width..(y + 1) * self.width])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.height).map(move |y| &self.samples[y * self.width..(y + 1) * self.width])
    }

    /// All samples, row-major
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Saturate every sample at `max`.
    ///
    /// Raw 8-bit samples reach 255. Clamping to `p - 1` brings them into the
    /// field before sharing.
    pub fn clamped(&self, max: u8) -> Self {
        self.map(|s| s.min(max))
    }

    /// Apply `f` to every sample
    pub fn map<F: Fn(u8) -> u8>(&self, f: F) -> Self {
        Self {
            width: self.width,
            height: self.height,
            samples: self.samples.iter().map(|&s| f(s)).collect(),
        }
    }

    /// Largest sample, or `None` for an empty grid
    pub fn max_sample(&self) -> Option<u8> {
        self.samples.iter().copied().max()
    }

    pub(crate) fn check_same_dimensions(&self, other: &Grid) -> Result<(), GridError> {
        if self.dimensions() != other.dimensions() {
            return Err(GridError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(())
    }
}

/// One party's share grid, tagged with its x-index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrid {
    /// Share index (1 to N); the i-th grid of a split has index i + 1
    pub index: u8,
    pub grid: Grid,
}

impl ShareGrid {
    pub fn new(index: u8, grid: Grid) -> Self {
        Self { index, grid }
    }
}
