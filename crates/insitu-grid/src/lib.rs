//! Structured-grid data model for the insitu simulation source.
//!
//! - [`GridSpec`]: immutable description of the global problem (cell
//!   counts, spacing, time stepping).
//! - [`SubDomain`]: an inclusive, axis-aligned index range inside the
//!   global grid, splittable along any axis.
//! - [`FieldGrid`]: owns the point and cell buffers of one sub-domain and
//!   hands out [`ExposedBuffer`] views to external consumers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod exposed;
pub mod field_grid;
pub mod lattice;
pub mod spec;
pub mod subdomain;

pub use exposed::ExposedBuffer;
pub use field_grid::FieldGrid;
pub use lattice::Lattice;
pub use spec::{Dimensionality, GridSpec, DOMAIN_LENGTH};
pub use subdomain::SubDomain;
