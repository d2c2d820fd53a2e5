//! Evaluate a [`Synthesizer`] over every vertex or cell of a grid.
//!
//! The buffer is walked one Z slab at a time (`z` outer, `y` middle, `x`
//! inner), matching the storage layout. In [`FillMode::Parallel`] the
//! slabs are handed to rayon; each sample depends only on its own
//! coordinates and `time`, so the result is identical to the sequential
//! walk.

use insitu_grid::FieldGrid;
use rayon::prelude::*;

use crate::synthesizer::Synthesizer;

/// How a fill distributes work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Single thread, storage order.
    #[default]
    Sequential,
    /// One rayon task per Z slab.
    Parallel,
}

/// Overwrite every vertex value with `synth` sampled at `time`.
pub fn fill_points<S>(grid: &mut FieldGrid, synth: &S, time: f64, mode: FillMode)
where
    S: Synthesizer + ?Sized,
{
    let lattice = grid.lattice();
    let [nx, ny, _] = grid.point_dims();
    fill(grid.point_values_mut(), nx * ny, nx, mode, |x, y, z| {
        synth.sample(lattice.coord(x, y, z), time)
    });
}

/// Overwrite every cell value with `synth` sampled at the cell centres.
pub fn fill_cells<S>(grid: &mut FieldGrid, synth: &S, time: f64, mode: FillMode)
where
    S: Synthesizer + ?Sized,
{
    let lattice = grid.lattice();
    let [nx, ny, _] = grid.cell_dims();
    fill(grid.cell_values_mut(), nx * ny, nx, mode, |x, y, z| {
        synth.sample(lattice.center(x, y, z), time)
    });
}

fn fill<F>(values: &mut [f64], slab_len: usize, nx: usize, mode: FillMode, f: F)
where
    F: Fn(i64, i64, i64) -> f64 + Sync,
{
    match mode {
        FillMode::Sequential => values
            .chunks_mut(slab_len)
            .enumerate()
            .for_each(|(z, slab)| fill_slab(z, slab, nx, &f)),
        FillMode::Parallel => values
            .par_chunks_mut(slab_len)
            .enumerate()
            .for_each(|(z, slab)| fill_slab(z, slab, nx, &f)),
    }
}

fn fill_slab<F>(z: usize, slab: &mut [f64], nx: usize, f: &F)
where
    F: Fn(i64, i64, i64) -> f64,
{
    for (i, value) in slab.iter_mut().enumerate() {
        let (x, y) = (i % nx, i / nx);
        *value = f(x as i64, y as i64, z as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insitu_grid::{GridSpec, SubDomain};

    struct IndexEcho;

    impl Synthesizer for IndexEcho {
        fn name(&self) -> &str {
            "index_echo"
        }

        fn sample(&self, coord: [f64; 3], time: f64) -> f64 {
            coord[0] + 100.0 * coord[1] + 10_000.0 * coord[2] + time
        }
    }

    fn grid(dims: [i64; 3]) -> FieldGrid {
        let spec = GridSpec::new(dims, 1, 0.5).unwrap();
        FieldGrid::new(&spec, &SubDomain::whole(&spec)).unwrap()
    }

    #[test]
    fn points_follow_coordinate_mapping() {
        let mut g = grid([2, 5, 10]);
        fill_points(&mut g, &IndexEcho, 0.0, FillMode::Sequential);
        let [px, py, pz] = g.point_dims();
        for z in 0..pz {
            for y in 0..py {
                for x in 0..px {
                    let c = g.coord(x as i64, y as i64, z as i64);
                    assert_eq!(g.point(x, y, z).unwrap(), IndexEcho.sample(c, 0.0));
                }
            }
        }
    }

    #[test]
    fn cells_sample_centres() {
        let mut g = grid([2, 2, 2]);
        fill_cells(&mut g, &IndexEcho, 1.0, FillMode::Sequential);
        let c = g.cell_center(1, 0, 1).unwrap();
        assert_eq!(g.cell(1, 0, 1).unwrap(), IndexEcho.sample(c, 1.0));
    }

    #[test]
    fn fill_points_leaves_cells_alone() {
        let mut g = grid([3, 3, 3]);
        g.set_cell(7.0, 0, 0, 0).unwrap();
        fill_points(&mut g, &IndexEcho, 2.0, FillMode::Parallel);
        assert_eq!(g.cell(0, 0, 0).unwrap(), 7.0);
        assert!(g.cell_values()[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn works_through_trait_object() {
        let mut g = grid([1, 1, 1]);
        let synth: Box<dyn Synthesizer> = Box::new(IndexEcho);
        fill_points(&mut g, synth.as_ref(), 0.25, FillMode::Sequential);
        assert_eq!(g.point(0, 0, 0).unwrap(), 0.25);
    }
}
