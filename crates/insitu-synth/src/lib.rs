//! Scalar field synthesis for the insitu simulation source.
//!
//! A [`Synthesizer`] maps a physical position and a simulation time to a
//! scalar. [`fill_points`] and [`fill_cells`] evaluate one over every
//! vertex or cell of a [`FieldGrid`](insitu_grid::FieldGrid), either
//! sequentially or across a rayon pool; both modes write bit-identical
//! buffers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod fill;
pub mod synthesizer;
pub mod velocity;

pub use fill::{fill_cells, fill_points, FillMode};
pub use synthesizer::Synthesizer;
pub use velocity::VelocityMagnitude;
