//! insitu: a synthetic data source for in-situ visualization runtimes.
//!
//! A structured grid is filled every time step from an analytic scalar
//! field and handed, buffers and all, to a visualization runtime. This is
//! the facade crate: it re-exports the sub-crates and hosts the
//! command-line front end used by the `insitu-sim` binary.
//!
//! # Quick start
//!
//! ```rust
//! use insitu::prelude::*;
//!
//! let config = SimConfig {
//!     dims: [4, 4, 4],
//!     time_steps: 2,
//!     ..SimConfig::default()
//! };
//! let runtime = Box::new(TraceRuntime::default());
//! let mut sim = TimeStepLoop::new(&config, Box::new(VelocityMagnitude), runtime).unwrap();
//! let summary = sim.run().unwrap();
//! assert_eq!(summary.steps, 2);
//! assert!((sim.grid().point(0, 0, 0).unwrap() - 1.0f64.sin()).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `insitu-core` | Axes, ids, field association, errors |
//! | [`grid`] | `insitu-grid` | `GridSpec`, `SubDomain`, `FieldGrid` |
//! | [`synth`] | `insitu-synth` | `Synthesizer` and the fill routines |
//! | [`engine`] | `insitu-engine` | Time-step loop, documents, runtimes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;

/// Axes, identifiers, and error types (`insitu-core`).
pub use insitu_core as types;

/// The structured-grid data model (`insitu-grid`).
///
/// [`grid::GridSpec`] describes the global problem, [`grid::SubDomain`]
/// one block of it, and [`grid::FieldGrid`] owns that block's buffers.
pub use insitu_grid as grid;

/// Scalar field synthesis (`insitu-synth`).
pub use insitu_synth as synth;

/// The time-step loop and runtime boundary (`insitu-engine`).
pub use insitu_engine as engine;

/// Common imports for driving a simulation.
pub mod prelude {
    pub use insitu_core::{Association, Axis, Cycle, DomainId, GridError, RuntimeError};
    pub use insitu_engine::{
        BovRuntime, ConfigError, Control, DataProvider, Node, RunMode, RunSummary, Runtime,
        SimConfig, StepError, StepMetrics, StopReason, TimeStepLoop, TraceRuntime,
    };
    pub use insitu_grid::{Dimensionality, FieldGrid, GridSpec, SubDomain};
    pub use insitu_synth::{FillMode, Synthesizer, VelocityMagnitude};
}

/// Install a `tracing` subscriber for the binary.
///
/// `RUST_LOG` overrides the default filter of `info`.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}
