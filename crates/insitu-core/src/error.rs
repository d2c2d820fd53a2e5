//! Error types for the insitu simulation source.
//!
//! Organized by subsystem: the grid model (construction, partitioning,
//! indexing) and the runtime handoff (session and publication).

use std::error::Error;
use std::fmt;

use crate::axis::Axis;
use crate::field::Association;

/// Errors from the structured-grid data model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A configured cell count is zero, negative, or too large.
    InvalidDimension {
        /// The offending axis.
        axis: Axis,
        /// The configured cell count.
        value: i64,
    },
    /// Sub-domain bounds with `max < min`, or `max == u32::MAX`, on some axis.
    InvalidBounds {
        /// The offending axis.
        axis: Axis,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },
    /// A sub-domain reaches past the edge of the global grid.
    SubDomainOutsideGrid {
        /// The offending axis.
        axis: Axis,
        /// Inclusive upper bound of the sub-domain.
        max: u32,
        /// Global cell count along the axis.
        dim: u32,
    },
    /// `split()` was called on an axis holding a single index.
    UnsplittableDomain {
        /// The axis that was asked to split.
        axis: Axis,
        /// Index count along that axis.
        size: u32,
    },
    /// A point or cell index lies outside the allocated dimensions.
    IndexOutOfRange {
        /// Whether the access targeted the point or the cell buffer.
        association: Association,
        /// The requested `(x, y, z)` index.
        index: [usize; 3],
        /// The dimensions of the targeted buffer.
        dims: [usize; 3],
    },
    /// A field buffer could not be allocated.
    AllocationFailure {
        /// The buffer that failed.
        association: Association,
        /// Requested element count, or `None` if the count overflowed `usize`.
        elements: Option<usize>,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { axis, value } => {
                write!(f, "invalid cell count {value} on axis {axis}, must be at least 1")
            }
            Self::InvalidBounds { axis, min, max } => {
                write!(f, "invalid bounds on axis {axis}: [{min}, {max}]")
            }
            Self::SubDomainOutsideGrid { axis, max, dim } => {
                write!(f, "sub-domain bound {max} on axis {axis} outside grid of {dim} cells")
            }
            Self::UnsplittableDomain { axis, size } => {
                write!(f, "cannot split axis {axis} of size {size}")
            }
            Self::IndexOutOfRange {
                association,
                index,
                dims,
            } => write!(
                f,
                "{association} index {index:?} out of range for dims {dims:?}"
            ),
            Self::AllocationFailure {
                association,
                elements,
            } => match elements {
                Some(n) => write!(f, "failed to allocate {n} {association} values"),
                None => write!(f, "{association} buffer size overflows usize"),
            },
        }
    }
}

impl Error for GridError {}

/// Errors surfaced by an external visualization runtime.
///
/// Any of these ends the time-step loop; the loop closes the session and
/// reports the error without publishing partial state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    /// The runtime refused to open a session.
    SessionOpen {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The runtime rejected a publish or an action list.
    Rejected {
        /// The call that was rejected (`"publish"`, `"execute"`, ...).
        call: String,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A call was made on a session that is not open.
    SessionClosed,
    /// The runtime failed while writing its output.
    Io {
        /// Description of the I/O failure.
        reason: String,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionOpen { reason } => write!(f, "failed to open session: {reason}"),
            Self::Rejected { call, reason } => write!(f, "{call} rejected: {reason}"),
            Self::SessionClosed => write!(f, "session is not open"),
            Self::Io { reason } => write!(f, "runtime i/o failure: {reason}"),
        }
    }
}

impl Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}
