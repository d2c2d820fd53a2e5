//! Global grid description.
//!
//! A [`GridSpec`] fixes the per-axis cell counts of the whole problem and
//! derives a uniform spacing from them so that every axis spans
//! [`DOMAIN_LENGTH`] physical units, regardless of resolution.

use insitu_core::{Axis, GridError};

/// Physical length of the global domain along each axis.
pub const DOMAIN_LENGTH: f64 = 10.0;

/// Whether the grid is a volume or a single plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dimensionality {
    /// A flat X/Y grid. The Z axis holds one cell and one layer of vertices.
    Planar,
    /// A full 3D grid.
    #[default]
    Volume,
}

impl Dimensionality {
    /// Number of spatial axes (2 or 3).
    pub fn rank(self) -> usize {
        match self {
            Self::Planar => 2,
            Self::Volume => 3,
        }
    }
}

/// Immutable description of the global problem.
///
/// Constructed once from configuration. Spacing is always derived from
/// the cell counts, so the two can never disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    dims: [u32; 3],
    spacing: [f64; 3],
    time_steps: u64,
    time_delta: f64,
    dimensionality: Dimensionality,
}

impl GridSpec {
    /// Describe a 3D grid with `dims` cells per axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if any count is below 1 or
    /// does not fit in a `u32`.
    pub fn new(dims: [i64; 3], time_steps: u64, time_delta: f64) -> Result<Self, GridError> {
        Self::build(dims, Dimensionality::Volume, time_steps, time_delta)
    }

    /// Describe a 2D grid with `dims` cells along X and Y.
    ///
    /// The Z axis is fixed at one cell.
    pub fn planar(dims: [i64; 2], time_steps: u64, time_delta: f64) -> Result<Self, GridError> {
        Self::build(
            [dims[0], dims[1], 1],
            Dimensionality::Planar,
            time_steps,
            time_delta,
        )
    }

    fn build(
        dims: [i64; 3],
        dimensionality: Dimensionality,
        time_steps: u64,
        time_delta: f64,
    ) -> Result<Self, GridError> {
        let mut checked = [0u32; 3];
        for axis in Axis::ALL {
            let value = dims[axis.index()];
            checked[axis.index()] = u32::try_from(value)
                .ok()
                .filter(|&v| v >= 1)
                .ok_or(GridError::InvalidDimension { axis, value })?;
        }
        Ok(Self {
            dims: checked,
            spacing: spacing_for(checked),
            time_steps,
            time_delta,
            dimensionality,
        })
    }

    /// Copy of this spec with new cell counts; spacing is recomputed.
    pub fn with_dims(&self, dims: [i64; 3]) -> Result<Self, GridError> {
        Self::build(dims, self.dimensionality, self.time_steps, self.time_delta)
    }

    /// Global cell counts per axis.
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// Cell count along one axis.
    pub fn dim(&self, axis: Axis) -> u32 {
        self.dims[axis.index()]
    }

    /// Physical distance between neighbouring vertices, per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Number of time steps the loop runs.
    pub fn time_steps(&self) -> u64 {
        self.time_steps
    }

    /// Simulation time added per step.
    pub fn time_delta(&self) -> f64 {
        self.time_delta
    }

    /// Volume or planar.
    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Shorthand for `dimensionality() == Dimensionality::Planar`.
    pub fn is_planar(&self) -> bool {
        self.dimensionality == Dimensionality::Planar
    }

    /// Total number of global cells.
    pub fn cell_count(&self) -> u64 {
        self.dims.iter().map(|&d| u64::from(d)).product()
    }

    /// Physical size of the global domain, `spacing * dims` per axis.
    pub fn extent(&self) -> [f64; 3] {
        let mut out = [0.0; 3];
        for i in 0..3 {
            out[i] = self.spacing[i] * f64::from(self.dims[i]);
        }
        out
    }
}

fn spacing_for(dims: [u32; 3]) -> [f64; 3] {
    dims.map(|d| DOMAIN_LENGTH / f64::from(d))
}
