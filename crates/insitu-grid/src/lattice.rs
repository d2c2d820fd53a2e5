//! Index-to-physical coordinate mapping.

/// Uniform placement of a block of vertices in physical space.
///
/// A plain `Copy` value, so fill loops can map indices to coordinates
/// while holding a mutable borrow of the buffers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lattice {
    /// Physical position of vertex `(0, 0, 0)`.
    pub origin: [f64; 3],
    /// Vertex spacing per axis.
    pub spacing: [f64; 3],
    /// Planar lattices keep cell centres in the vertex plane.
    pub planar: bool,
}

impl Lattice {
    /// `origin + spacing * index`, per axis. Total over any index.
    pub fn coord(&self, x: i64, y: i64, z: i64) -> [f64; 3] {
        let index = [x, y, z];
        std::array::from_fn(|i| self.origin[i] + self.spacing[i] * index[i] as f64)
    }

    /// Centre of the cell whose lowest vertex is `(x, y, z)`.
    pub fn center(&self, x: i64, y: i64, z: i64) -> [f64; 3] {
        let index = [x, y, z];
        let mut c: [f64; 3] =
            std::array::from_fn(|i| self.origin[i] + self.spacing[i] * (index[i] as f64 + 0.5));
        if self.planar {
            c[2] = self.origin[2];
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_is_linear() {
        let l = Lattice {
            origin: [1.0, 2.0, 3.0],
            spacing: [0.5, 0.25, 2.0],
            planar: false,
        };
        assert_eq!(l.coord(0, 0, 0), [1.0, 2.0, 3.0]);
        assert_eq!(l.coord(2, 4, 1), [2.0, 3.0, 5.0]);
        assert_eq!(l.center(0, 0, 0), [1.25, 2.125, 4.0]);
    }

    #[test]
    fn planar_center_stays_in_plane() {
        let l = Lattice {
            origin: [0.0; 3],
            spacing: [1.0, 1.0, 10.0],
            planar: true,
        };
        assert_eq!(l.center(0, 0, 0), [0.5, 0.5, 0.0]);
    }
}
