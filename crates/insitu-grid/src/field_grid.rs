//! Per-sub-domain field storage.
//!
//! [`FieldGrid`] owns one scalar per vertex and one scalar per cell of a
//! [`SubDomain`], laid out row-major with X varying fastest:
//!
//! ```text
//! offset = z * dims.x * dims.y + y * dims.x + x
//! ```
//!
//! Both buffers are allocated exactly once, in [`FieldGrid::new`], and are
//! mutated in place for the rest of the grid's life.

use insitu_core::{Association, Axis, GridError};

use crate::exposed::ExposedBuffer;
use crate::lattice::Lattice;
use crate::spec::{Dimensionality, GridSpec};
use crate::subdomain::SubDomain;

/// Point and cell buffers for one sub-domain, plus its placement in
/// global physical space.
#[derive(Debug)]
pub struct FieldGrid {
    sub_domain: SubDomain,
    dimensionality: Dimensionality,
    cell_dims: [usize; 3],
    point_dims: [usize; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
    point_values: Vec<f64>,
    cell_values: Vec<f64>,
}

impl FieldGrid {
    /// Allocate zeroed buffers for `sub_domain` of the grid described by `spec`.
    ///
    /// A structured block of `n` cells has `n + 1` vertices per axis. On a
    /// planar grid the Z axis keeps a single layer of vertices.
    ///
    /// # Errors
    ///
    /// - [`GridError::SubDomainOutsideGrid`] if the block reaches past the
    ///   global cell counts.
    /// - [`GridError::AllocationFailure`] if either buffer cannot be
    ///   reserved or its length overflows `usize`.
    pub fn new(spec: &GridSpec, sub_domain: &SubDomain) -> Result<Self, GridError> {
        let dims = spec.dims();
        for axis in Axis::ALL {
            let max = sub_domain.maxs()[axis.index()];
            let dim = dims[axis.index()];
            if max >= dim {
                return Err(GridError::SubDomainOutsideGrid { axis, max, dim });
            }
        }

        let cell_dims = sub_domain.sizes().map(|s| s as usize);
        let mut point_dims = cell_dims.map(|d| d + 1);
        if spec.is_planar() {
            point_dims[Axis::Z.index()] = 1;
        }

        let spacing = spec.spacing();
        let mins = sub_domain.mins();
        let origin = std::array::from_fn(|i| f64::from(mins[i]) * spacing[i]);

        Ok(Self {
            sub_domain: *sub_domain,
            dimensionality: spec.dimensionality(),
            cell_dims,
            point_dims,
            spacing,
            origin,
            point_values: allocate(Association::Vertex, point_dims)?,
            cell_values: allocate(Association::Element, cell_dims)?,
        })
    }

    /// The block of global cells this grid stores.
    pub fn sub_domain(&self) -> &SubDomain {
        &self.sub_domain
    }

    /// Volume or planar.
    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Cells per axis.
    pub fn cell_dims(&self) -> [usize; 3] {
        self.cell_dims
    }

    /// Vertices per axis.
    pub fn point_dims(&self) -> [usize; 3] {
        self.point_dims
    }

    /// Vertex spacing per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Physical position of vertex `(0, 0, 0)`.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Length of the point buffer.
    pub fn point_count(&self) -> usize {
        self.point_values.len()
    }

    /// Length of the cell buffer.
    pub fn cell_count(&self) -> usize {
        self.cell_values.len()
    }

    /// Physical position of vertex `(x, y, z)`.
    ///
    /// Total over any index triple; only in-range indices name a vertex
    /// that actually exists.
    pub fn coord(&self, x: i64, y: i64, z: i64) -> [f64; 3] {
        self.lattice().coord(x, y, z)
    }

    /// The index-to-coordinate mapping of this block, detached from the buffers.
    pub fn lattice(&self) -> Lattice {
        Lattice {
            origin: self.origin,
            spacing: self.spacing,
            planar: self.dimensionality == Dimensionality::Planar,
        }
    }

    /// [`coord`](Self::coord) restricted to existing vertices.
    pub fn checked_coord(&self, x: usize, y: usize, z: usize) -> Result<[f64; 3], GridError> {
        offset(Association::Vertex, self.point_dims, x, y, z)?;
        Ok(self.coord(x as i64, y as i64, z as i64))
    }

    /// Physical position of the centre of cell `(x, y, z)`.
    ///
    /// On a planar grid the centre lies in the vertex plane.
    pub fn cell_center(&self, x: usize, y: usize, z: usize) -> Result<[f64; 3], GridError> {
        offset(Association::Element, self.cell_dims, x, y, z)?;
        Ok(self.lattice().center(x as i64, y as i64, z as i64))
    }

    /// Vertex coordinates along one axis, for rectilinear mesh descriptions.
    pub fn axis_coords(&self, axis: Axis) -> Vec<f64> {
        let i = axis.index();
        (0..self.point_dims[i])
            .map(|k| self.origin[i] + self.spacing[i] * k as f64)
            .collect()
    }

    /// Physical `(low, high)` extent of the block on each axis.
    pub fn bounds(&self) -> [(f64, f64); 3] {
        std::array::from_fn(|i| {
            let span = if self.point_dims[i] > 1 {
                self.cell_dims[i] as f64
            } else {
                0.0
            };
            (self.origin[i], self.origin[i] + self.spacing[i] * span)
        })
    }

    /// Flat buffer offset of vertex `(x, y, z)`.
    pub fn point_offset(&self, x: usize, y: usize, z: usize) -> Result<usize, GridError> {
        offset(Association::Vertex, self.point_dims, x, y, z)
    }

    /// Flat buffer offset of cell `(x, y, z)`.
    pub fn cell_offset(&self, x: usize, y: usize, z: usize) -> Result<usize, GridError> {
        offset(Association::Element, self.cell_dims, x, y, z)
    }

    /// Store `value` at vertex `(x, y, z)`.
    pub fn set_point(&mut self, value: f64, x: usize, y: usize, z: usize) -> Result<(), GridError> {
        let i = self.point_offset(x, y, z)?;
        self.point_values[i] = value;
        Ok(())
    }

    /// Value at vertex `(x, y, z)`.
    pub fn point(&self, x: usize, y: usize, z: usize) -> Result<f64, GridError> {
        Ok(self.point_values[self.point_offset(x, y, z)?])
    }

    /// Store `value` at cell `(x, y, z)`.
    pub fn set_cell(&mut self, value: f64, x: usize, y: usize, z: usize) -> Result<(), GridError> {
        let i = self.cell_offset(x, y, z)?;
        self.cell_values[i] = value;
        Ok(())
    }

    /// Value at cell `(x, y, z)`.
    pub fn cell(&self, x: usize, y: usize, z: usize) -> Result<f64, GridError> {
        Ok(self.cell_values[self.cell_offset(x, y, z)?])
    }

    /// All vertex values in storage order.
    pub fn point_values(&self) -> &[f64] {
        &self.point_values
    }

    /// Mutable vertex values in storage order. The length is fixed.
    pub fn point_values_mut(&mut self) -> &mut [f64] {
        &mut self.point_values
    }

    /// All cell values in storage order.
    pub fn cell_values(&self) -> &[f64] {
        &self.cell_values
    }

    /// Mutable cell values in storage order. The length is fixed.
    pub fn cell_values_mut(&mut self) -> &mut [f64] {
        &mut self.cell_values
    }

    /// Hand out the live point buffer.
    pub fn expose_points(&mut self) -> ExposedBuffer<'_> {
        ExposedBuffer::new(Association::Vertex, &mut self.point_values)
    }

    /// Hand out the live cell buffer.
    pub fn expose_cells(&mut self) -> ExposedBuffer<'_> {
        ExposedBuffer::new(Association::Element, &mut self.cell_values)
    }

    /// Hand out both live buffers at once, points first.
    pub fn expose(&mut self) -> (ExposedBuffer<'_>, ExposedBuffer<'_>) {
        (
            ExposedBuffer::new(Association::Vertex, &mut self.point_values),
            ExposedBuffer::new(Association::Element, &mut self.cell_values),
        )
    }
}

fn offset(
    association: Association,
    dims: [usize; 3],
    x: usize,
    y: usize,
    z: usize,
) -> Result<usize, GridError> {
    if x >= dims[0] || y >= dims[1] || z >= dims[2] {
        return Err(GridError::IndexOutOfRange {
            association,
            index: [x, y, z],
            dims,
        });
    }
    Ok(z * dims[0] * dims[1] + y * dims[0] + x)
}

fn allocate(association: Association, dims: [usize; 3]) -> Result<Vec<f64>, GridError> {
    let elements = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(GridError::AllocationFailure {
            association,
            elements: None,
        })?;
    let mut values = Vec::new();
    values
        .try_reserve_exact(elements)
        .map_err(|_| GridError::AllocationFailure {
            association,
            elements: Some(elements),
        })?;
    values.resize(elements, 0.0);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn whole(dims: [i64; 3]) -> FieldGrid {
        let spec = GridSpec::new(dims, 1, 0.5).unwrap();
        FieldGrid::new(&spec, &SubDomain::whole(&spec)).unwrap()
    }

    #[test]
    fn single_cell_layout() {
        let grid = whole([1, 1, 1]);
        assert_eq!(grid.cell_dims(), [1, 1, 1]);
        assert_eq!(grid.point_dims(), [2, 2, 2]);
        assert_eq!(grid.point_count(), 8);
        assert_eq!(grid.cell_count(), 1);
        assert!(grid.point_values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn point_dims_exceed_cell_dims_by_one() {
        let grid = whole([4, 3, 2]);
        assert_eq!(grid.cell_dims(), [4, 3, 2]);
        assert_eq!(grid.point_dims(), [5, 4, 3]);
        assert_eq!(grid.point_count(), 60);
        assert_eq!(grid.cell_count(), 24);
    }

    #[test]
    fn overflowing_buffer_length_is_allocation_failure() {
        let spec = GridSpec::new([u32::MAX as i64; 3], 1, 0.5).unwrap();
        let err = FieldGrid::new(&spec, &SubDomain::whole(&spec)).unwrap_err();
        assert_eq!(
            err,
            GridError::AllocationFailure {
                association: Association::Vertex,
                elements: None,
            }
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn unreservable_buffer_is_allocation_failure() {
        let spec = GridSpec::new([200_000; 3], 1, 0.5).unwrap();
        let err = FieldGrid::new(&spec, &SubDomain::whole(&spec)).unwrap_err();
        assert_eq!(
            err,
            GridError::AllocationFailure {
                association: Association::Vertex,
                elements: Some(200_001usize.pow(3)),
            }
        );
    }

    #[test]
    fn coord_at_zero_is_origin() {
        let spec = GridSpec::new([8, 8, 8], 1, 0.5).unwrap();
        let mut left = SubDomain::whole(&spec);
        let right = left.split(Axis::X).unwrap();
        let grid = FieldGrid::new(&spec, &right).unwrap();
        assert_eq!(grid.origin(), [5.0, 0.0, 0.0]);
        assert_eq!(grid.coord(0, 0, 0), grid.origin());
    }

    #[test]
    fn coord_at_last_vertex() {
        let grid = whole([4, 4, 4]);
        let last = grid.point_dims()[0] as i64 - 1;
        let c = grid.coord(last, 0, 0);
        assert_eq!(c[0], grid.origin()[0] + grid.spacing()[0] * last as f64);
        assert_eq!(c[0], 10.0);
    }

    #[test]
    fn coord_is_total() {
        let grid = whole([2, 2, 2]);
        assert_eq!(grid.coord(-1, 100, 0), [-5.0, 500.0, 0.0]);
    }

    #[test]
    fn checked_coord_rejects_missing_vertex() {
        let grid = whole([2, 2, 2]);
        assert!(grid.checked_coord(2, 2, 2).is_ok());
        let err = grid.checked_coord(3, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            GridError::IndexOutOfRange {
                association: Association::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn offsets_are_row_major_x_fastest() {
        let grid = whole([3, 3, 3]);
        assert_eq!(grid.point_offset(1, 0, 0).unwrap(), 1);
        assert_eq!(grid.point_offset(0, 1, 0).unwrap(), 4);
        assert_eq!(grid.point_offset(0, 0, 1).unwrap(), 16);
        assert_eq!(grid.cell_offset(2, 2, 2).unwrap(), 26);
    }

    #[test]
    fn set_point_out_of_range() {
        let mut grid = whole([2, 2, 2]);
        let err = grid.set_point(1.0, 0, 3, 0).unwrap_err();
        assert_eq!(
            err,
            GridError::IndexOutOfRange {
                association: Association::Vertex,
                index: [0, 3, 0],
                dims: [3, 3, 3],
            }
        );
        assert!(grid.point_values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn set_cell_out_of_range() {
        let mut grid = whole([2, 2, 2]);
        assert!(grid.set_cell(1.0, 1, 1, 1).is_ok());
        let err = grid.set_cell(1.0, 2, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            GridError::IndexOutOfRange {
                association: Association::Element,
                ..
            }
        ));
        assert_eq!(grid.cell(1, 1, 1).unwrap(), 1.0);
    }

    #[test]
    fn sub_domain_past_grid_edge_rejected() {
        let spec = GridSpec::new([4, 4, 4], 1, 0.5).unwrap();
        let sd = SubDomain::new([0, 0, 0], [4, 3, 3]).unwrap();
        let err = FieldGrid::new(&spec, &sd).unwrap_err();
        assert_eq!(
            err,
            GridError::SubDomainOutsideGrid {
                axis: Axis::X,
                max: 4,
                dim: 4
            }
        );
    }

    #[test]
    fn planar_grid_has_single_vertex_layer() {
        let spec = GridSpec::planar([4, 2], 1, 0.5).unwrap();
        let grid = FieldGrid::new(&spec, &SubDomain::whole(&spec)).unwrap();
        assert_eq!(grid.point_dims(), [5, 3, 1]);
        assert_eq!(grid.cell_dims(), [4, 2, 1]);
        assert_eq!(grid.point_count(), 15);
        assert_eq!(grid.cell_count(), 8);
        assert_eq!(grid.cell_center(0, 0, 0).unwrap()[2], 0.0);
        assert_eq!(grid.bounds()[2], (0.0, 0.0));
    }

    #[test]
    fn cell_center_is_half_spacing_in() {
        let grid = whole([4, 4, 4]);
        assert_eq!(grid.cell_center(0, 1, 3).unwrap(), [1.25, 3.75, 8.75]);
    }

    #[test]
    fn axis_coords_span_block() {
        let grid = whole([4, 2, 1]);
        assert_eq!(grid.axis_coords(Axis::X), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(grid.axis_coords(Axis::Y), vec![0.0, 5.0, 10.0]);
        assert_eq!(grid.axis_coords(Axis::Z), vec![0.0, 10.0]);
        assert_eq!(grid.bounds()[0], (0.0, 10.0));
    }

    #[test]
    fn exposed_views_alias_owned_buffers() {
        let mut grid = whole([2, 2, 2]);
        let point_addr = grid.point_values().as_ptr();
        {
            let (mut points, mut cells) = grid.expose();
            assert_eq!(points.as_ptr(), point_addr);
            assert_eq!(points.len(), 27);
            assert_eq!(cells.association(), Association::Element);
            points.as_mut_slice()[0] = 3.5;
            cells.as_mut_slice()[7] = -1.0;
        }
        assert_eq!(grid.point(0, 0, 0).unwrap(), 3.5);
        assert_eq!(grid.cell(1, 1, 1).unwrap(), -1.0);
        assert_eq!(grid.point_values().as_ptr(), point_addr);
    }

    proptest! {
        #[test]
        fn set_then_read_returns_value(
            dx in 1i64..6,
            dy in 1i64..6,
            dz in 1i64..6,
            x in 0usize..7,
            y in 0usize..7,
            z in 0usize..7,
            value in -1.0e6f64..1.0e6,
        ) {
            let mut grid = whole([dx, dy, dz]);
            let [px, py, pz] = grid.point_dims();
            let (x, y, z) = (x % px, y % py, z % pz);
            grid.set_point(value, x, y, z).unwrap();
            prop_assert_eq!(grid.point(x, y, z).unwrap(), value);

            let [cx, cy, cz] = grid.cell_dims();
            let (x, y, z) = (x % cx, y % cy, z % cz);
            grid.set_cell(value, x, y, z).unwrap();
            prop_assert_eq!(grid.cell(x, y, z).unwrap(), value);
        }
    }
}
