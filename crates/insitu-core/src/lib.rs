//! Core types and traits for the insitu simulation source.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: axes, identifiers,
//! field associations, and the error types raised by the grid model and
//! the runtime handoff.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod axis;
pub mod error;
pub mod field;
pub mod id;

pub use axis::Axis;
pub use error::{GridError, RuntimeError};
pub use field::Association;
pub use id::{Cycle, DomainId};
