//! Spatial indexing abstractions for proximity queries over world positions.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors emitted by proximity index implementations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Indicates configuration values that cannot be used (e.g., non-positive cell size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Common behaviour exposed by proximity indices.
pub trait ProximityIndex {
    /// Rebuild internal structures from a flat position list. Nothing is
    /// retained from previous builds.
    fn rebuild(&mut self, positions: &[(f32, f32)]) -> Result<(), IndexError>;

    /// Visit every indexed position other than `origin_idx` within the
    /// provided squared radius, passing its index and squared distance.
    fn neighbors_within(
        &self,
        origin_idx: usize,
        radius_sq: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    );
}

/// Uniform sparse hash grid over an unbounded plane.
///
/// Positions are bucketed by `(floor(x / cell), floor(y / cell))`; a radius
/// query scans the bucket ring covering the radius and filters by exact
/// distance. With cell size equal to the query radius this is the classic
/// 3x3 neighbourhood scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseGridIndex {
    /// Edge length of each grid cell used for bucketing positions.
    pub cell_size: f32,
    #[serde(skip)]
    inv_cell_size: f32,
    #[serde(skip)]
    buckets: HashMap<(i32, i32), Vec<usize>>,
    #[serde(skip)]
    cells: Vec<(i32, i32)>,
    #[serde(skip)]
    positions: Vec<(f32, f32)>,
}

impl SparseGridIndex {
    /// Create a new grid with the provided cell size.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let inv_cell_size = if cell_size > 0.0 {
            1.0 / cell_size
        } else {
            0.0
        };
        Self {
            cell_size,
            inv_cell_size,
            buckets: HashMap::new(),
            cells: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Number of indexed positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true when nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    fn cell_from_point(&self, x: f32, y: f32) -> (i32, i32) {
        (
            Self::discretize(x * self.inv_cell_size),
            Self::discretize(y * self.inv_cell_size),
        )
    }

    #[allow(clippy::cast_possible_truncation)]
    fn discretize(value: f32) -> i32 {
        value.floor().clamp(i32::MIN as f32, i32::MAX as f32) as i32
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell_reach(&self, radius: f32) -> i32 {
        (radius * self.inv_cell_size).ceil().max(1.0) as i32
    }
}

impl Default for SparseGridIndex {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl ProximityIndex for SparseGridIndex {
    fn rebuild(&mut self, positions: &[(f32, f32)]) -> Result<(), IndexError> {
        if self.cell_size <= 0.0 {
            return Err(IndexError::InvalidConfig("cell_size must be positive"));
        }
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.cells.clear();
        self.cells.reserve(positions.len());
        self.buckets.clear();
        self.buckets.reserve(positions.len());

        for (idx, &(x, y)) in positions.iter().enumerate() {
            let key = self.cell_from_point(x, y);
            self.cells.push(key);
            self.buckets.entry(key).or_default().push(idx);
        }
        Ok(())
    }

    fn neighbors_within(
        &self,
        origin_idx: usize,
        radius_sq: f32,
        visitor: &mut dyn FnMut(usize, OrderedFloat<f32>),
    ) {
        if origin_idx >= self.positions.len() || radius_sq < 0.0 {
            return;
        }
        let (ox, oy) = self.positions[origin_idx];
        let (cell_x, cell_y) = self.cells[origin_idx];
        let reach = self.cell_reach(radius_sq.sqrt());

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let Some(indices) = self.buckets.get(&(cell_x + dx, cell_y + dy)) else {
                    continue;
                };
                for &other_idx in indices {
                    if other_idx == origin_idx {
                        continue;
                    }
                    let (px, py) = self.positions[other_idx];
                    let ddx = px - ox;
                    let ddy = py - oy;
                    let dist_sq = ddx.mul_add(ddx, ddy * ddy);
                    if dist_sq <= radius_sq {
                        visitor(other_idx, OrderedFloat(dist_sq));
                    }
                }
            }
        }
    }
}
