//! Axis-aligned index ranges within the global grid.

use insitu_core::{Axis, GridError};

use crate::spec::GridSpec;

/// A contiguous block of global cell indices, inclusive on both ends.
///
/// `maxs[axis] >= mins[axis]` holds on every axis, so each sub-domain
/// contains at least one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubDomain {
    mins: [u32; 3],
    maxs: [u32; 3],
}

impl SubDomain {
    /// Build a sub-domain from inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBounds`] if `maxs < mins` on any axis,
    /// or if a bound equals `u32::MAX`. Global cell counts fit in `u32`, so
    /// the last valid cell index is `u32::MAX - 1`.
    pub fn new(mins: [u32; 3], maxs: [u32; 3]) -> Result<Self, GridError> {
        for axis in Axis::ALL {
            let (min, max) = (mins[axis.index()], maxs[axis.index()]);
            if max < min || max == u32::MAX {
                return Err(GridError::InvalidBounds { axis, min, max });
            }
        }
        Ok(Self { mins, maxs })
    }

    /// The whole global grid: `[0, dims - 1]` on every axis.
    pub fn whole(spec: &GridSpec) -> Self {
        Self {
            mins: [0; 3],
            maxs: spec.dims().map(|d| d - 1),
        }
    }

    /// Inclusive lower bounds.
    pub fn mins(&self) -> [u32; 3] {
        self.mins
    }

    /// Inclusive upper bounds.
    pub fn maxs(&self) -> [u32; 3] {
        self.maxs
    }

    /// Number of indices covered along `axis` (always at least 1).
    pub fn size(&self, axis: Axis) -> u32 {
        let i = axis.index();
        self.maxs[i] - self.mins[i] + 1
    }

    /// Index counts on all three axes.
    pub fn sizes(&self) -> [u32; 3] {
        Axis::ALL.map(|axis| self.size(axis))
    }

    /// Total number of cells in the block.
    pub fn cell_count(&self) -> u64 {
        self.sizes().iter().map(|&s| u64::from(s)).product()
    }

    /// Whether a global cell index falls inside this block.
    pub fn contains(&self, index: [u32; 3]) -> bool {
        (0..3).all(|i| index[i] >= self.mins[i] && index[i] <= self.maxs[i])
    }

    /// True iff `axis` holds more than one index.
    pub fn can_split(&self, axis: Axis) -> bool {
        self.size(axis) > 1
    }

    /// Bisect along `axis`.
    ///
    /// `self` shrinks to the left half (`floor(size / 2)` indices) and the
    /// returned block is the right half (the remainder). Other axes are
    /// copied into both halves unchanged. The halves are adjacent,
    /// disjoint, and together cover the original range.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnsplittableDomain`] if `axis` holds a single
    /// index; `self` is left untouched.
    pub fn split(&mut self, axis: Axis) -> Result<SubDomain, GridError> {
        if !self.can_split(axis) {
            return Err(GridError::UnsplittableDomain {
                axis,
                size: self.size(axis),
            });
        }
        let i = axis.index();
        let left = self.size(axis) / 2;
        let mut right = *self;
        self.maxs[i] = self.mins[i] + left - 1;
        right.mins[i] = self.maxs[i] + 1;
        Ok(right)
    }
}
