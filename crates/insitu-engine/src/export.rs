//! Brick-of-values (BOV) file export.
//!
//! A BOV dataset is two files: a raw array of little-endian `f32` values
//! in z/y/x order, and a small text header describing it:
//!
//! ```text
//! DATA_FILE: field_0003
//! DATA_SIZE: 5 5 5
//! DATA_FORMAT: FLOAT
//! VARIABLE: nodal_noise
//! DATA_ENDIAN: LITTLE
//! CENTERING: nodal
//! BRICK_ORIGIN: 0 0 0
//! BRICK_SIZE: 10 10 10
//! ```

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use insitu_core::{Association, RuntimeError};
use insitu_grid::FieldGrid;

use crate::document::Node;

/// Errors from writing or assembling a BOV dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportError {
    /// A file could not be created or written.
    Io {
        /// The file being written.
        path: PathBuf,
        /// Description of the I/O failure.
        reason: String,
    },
    /// A mesh document lacks an entry the brick needs.
    MissingEntry {
        /// Slash-separated path of the missing entry.
        path: String,
    },
    /// The value count does not match the brick dimensions.
    ShapeMismatch {
        /// Product of the brick dimensions.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "writing {}: {reason}", path.display()),
            Self::MissingEntry { path } => write!(f, "mesh document has no '{path}'"),
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "brick expects {expected} values, got {actual}")
            }
        }
    }
}

impl Error for ExportError {}

impl From<ExportError> for RuntimeError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Io { path, reason } => RuntimeError::Io {
                reason: format!("{}: {reason}", path.display()),
            },
            other => RuntimeError::Rejected {
                call: "publish".into(),
                reason: other.to_string(),
            },
        }
    }
}

/// A dense block of values with its placement in space.
#[derive(Clone, Copy, Debug)]
pub struct BovBrick<'a> {
    values: &'a [f64],
    dims: [usize; 3],
    origin: [f64; 3],
    size: [f64; 3],
    centering: Association,
}

impl<'a> BovBrick<'a> {
    /// Wrap `values` as a brick of `dims` samples.
    ///
    /// # Errors
    ///
    /// [`ExportError::ShapeMismatch`] if `values` does not hold exactly
    /// `dims[0] * dims[1] * dims[2]` entries.
    pub fn new(
        values: &'a [f64],
        dims: [usize; 3],
        origin: [f64; 3],
        size: [f64; 3],
    ) -> Result<Self, ExportError> {
        let expected = dims.iter().product();
        if values.len() != expected {
            return Err(ExportError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            dims,
            origin,
            size,
            centering: Association::Vertex,
        })
    }

    /// The point field of `grid`, spanning the grid's bounds.
    pub fn from_grid(grid: &'a FieldGrid) -> Self {
        let bounds = grid.bounds();
        Self {
            values: grid.point_values(),
            dims: grid.point_dims(),
            origin: grid.origin(),
            size: bounds.map(|(lo, hi)| hi - lo),
            centering: Association::Vertex,
        }
    }

    /// The field `field` of a published mesh document.
    ///
    /// Cell-centred fields get one sample fewer per axis than the
    /// coordinate set (but never fewer than one).
    pub fn from_document(mesh: &'a Node<'_>, field: &str) -> Result<Self, ExportError> {
        let lookup = |path: String| {
            mesh.get(&path)
                .ok_or(ExportError::MissingEntry { path })
        };
        let values = lookup(format!("fields/{field}/values"))?
            .as_external()
            .ok_or_else(|| ExportError::MissingEntry {
                path: format!("fields/{field}/values"),
            })?;
        let centering = values.association();

        let mut dims = [1usize; 3];
        let mut origin = [0.0; 3];
        let mut size = [0.0; 3];
        let axes = [("i", "x", "dx"), ("j", "y", "dy"), ("k", "z", "dz")];
        for (a, (dim_key, origin_key, spacing_key)) in axes.into_iter().enumerate() {
            let Some(points) = mesh
                .get(&format!("coordsets/coords/dims/{dim_key}"))
                .and_then(Node::as_int)
            else {
                // Planar meshes carry no third axis.
                if a == 2 {
                    break;
                }
                return Err(ExportError::MissingEntry {
                    path: format!("coordsets/coords/dims/{dim_key}"),
                });
            };
            let points = usize::try_from(points).unwrap_or(1).max(1);
            let spacing = lookup(format!("coordsets/coords/spacing/{spacing_key}"))?
                .as_float()
                .unwrap_or(0.0);
            origin[a] = lookup(format!("coordsets/coords/origin/{origin_key}"))?
                .as_float()
                .unwrap_or(0.0);
            size[a] = spacing * (points - 1) as f64;
            dims[a] = match centering {
                Association::Vertex => points,
                Association::Element => (points - 1).max(1),
            };
        }

        let mut brick = Self::new(values.as_slice(), dims, origin, size)?;
        brick.centering = centering;
        Ok(brick)
    }

    /// The samples, z/y/x order.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Samples per axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Position of the first sample.
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Physical extent per axis.
    pub fn size(&self) -> [f64; 3] {
        self.size
    }

    /// The header text for a brick whose data lives in `data_file`.
    pub fn header(&self, data_file: &str, variable: &str) -> String {
        let [nx, ny, nz] = self.dims;
        let [ox, oy, oz] = self.origin;
        let [sx, sy, sz] = self.size;
        let centering = match self.centering {
            Association::Vertex => "nodal",
            Association::Element => "zonal",
        };
        format!(
            "DATA_FILE: {data_file}\n\
             DATA_SIZE: {nx} {ny} {nz}\n\
             DATA_FORMAT: FLOAT\n\
             VARIABLE: {variable}\n\
             DATA_ENDIAN: LITTLE\n\
             CENTERING: {centering}\n\
             BRICK_ORIGIN: {ox} {oy} {oz}\n\
             BRICK_SIZE: {sx} {sy} {sz}\n"
        )
    }
}

/// Write `brick` as `dir/<prefix>` (raw data) and `dir/<prefix>.bov`
/// (header). Returns the header path.
pub fn write_bov(
    dir: &Path,
    prefix: &str,
    variable: &str,
    brick: &BovBrick<'_>,
) -> Result<PathBuf, ExportError> {
    let data_path = dir.join(prefix);
    let header_path = dir.join(format!("{prefix}.bov"));

    write_file(&data_path, |out| {
        for v in brick.values() {
            out.write_all(&(*v as f32).to_le_bytes())?;
        }
        Ok(())
    })?;
    write_file(&header_path, |out| {
        out.write_all(brick.header(prefix, variable).as_bytes())
    })?;
    Ok(header_path)
}

fn write_file<F>(path: &Path, body: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let io_err = |e: std::io::Error| ExportError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    body(&mut out).map_err(io_err)?;
    out.flush().map_err(io_err)
}
