#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod grid;
mod legend;
mod render;
mod rule;
mod shape;

#[cfg(test)]
mod test_canvas;

pub use config::WallConfig;
pub use grid::{CellUpdate, Grid, TriangularCells};
pub use legend::Legend;
pub use render::{FrameRequest, Layout, MARGIN, Renderer};
pub use rule::{ColorRule, RuleTable};
pub use shape::{Ratio, Shape, UnknownShape, Vertices};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt;

/// Position of one brick: `row` counts down from the full top row, `col` counts
/// from the left end of that row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Loc {
    pub row: u32,
    pub col: u32,
}

impl Loc {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Flat index into a triangular array whose top row has `size` cells, or
    /// `None` if the position lies outside the triangle.
    pub fn triangular_index(&self, size: u32) -> Option<usize> {
        if self.row < size && self.col < size - self.row {
            let size = size as usize;
            let row = self.row as usize;
            Some(row * size - row * row.saturating_sub(1) / 2 + self.col as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Contract violations raised by the wall. None of these are expected at run
/// time; they mean the driver or the color rule is broken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WallError {
    OutOfRange { loc: Loc, size: u32 },
    InvalidPaletteIndex { index: usize, num_colors: usize },
    InvalidSize,
    EmptyPalette,
    InvalidRuleTable(String),
}

impl fmt::Display for WallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WallError::OutOfRange { loc, size } => {
                write!(f, "Position {} is outside a wall of size {}", loc, size)
            }
            WallError::InvalidPaletteIndex { index, num_colors } => write!(
                f,
                "Palette index {} is invalid for a palette of {} colors",
                index, num_colors
            ),
            WallError::InvalidSize => write!(f, "Wall size must be positive"),
            WallError::EmptyPalette => write!(f, "Palette must contain at least one color"),
            WallError::InvalidRuleTable(reason) => write!(f, "Invalid rule table: {}", reason),
        }
    }
}

impl Error for WallError {}

/// Draws random rows of palette indices for the top of the wall.
#[derive(Debug)]
pub struct RowSampler {
    rng: SmallRng,
}

impl RowSampler {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self, len: u32, num_colors: usize) -> Vec<usize> {
        (0..len).map(|_| self.rng.random_range(0..num_colors)).collect()
    }
}

impl Default for RowSampler {
    fn default() -> Self {
        Self::new()
    }
}
