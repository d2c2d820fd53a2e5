//! Time-step loop and visualization-runtime handoff.
//!
//! [`TimeStepLoop`] owns a [`FieldGrid`](insitu_grid::FieldGrid), refills
//! its point buffer from a [`Synthesizer`](insitu_synth::Synthesizer)
//! every step, and publishes the live buffers to a [`Runtime`] through a
//! nested key/value [`Node`] document. Publication is synchronous: the
//! document borrows the grid, so the next step cannot begin until the
//! runtime has returned from `publish` and both action lists.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builtin;
pub mod config;
pub mod document;
pub mod export;
pub mod metrics;
pub mod protocol;
pub mod provider;
pub mod runtime;
pub mod step_loop;

pub use builtin::{BovRuntime, TraceRuntime};
pub use config::{ConfigError, SimConfig};
pub use document::Node;
pub use export::{BovBrick, ExportError};
pub use metrics::StepMetrics;
pub use provider::{ControlCommand, DataProvider, ProviderError, RunMode};
pub use runtime::{Control, Runtime, Session};
pub use step_loop::{LoopState, RunSummary, StepError, StepReport, StopReason, TimeStepLoop};
