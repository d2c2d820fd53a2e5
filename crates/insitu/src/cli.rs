//! Command-line arguments for `insitu-sim`.

use std::path::PathBuf;

use clap::Parser;
use insitu_engine::config::parse_dims;
use insitu_engine::{ConfigError, SimConfig};
use insitu_synth::FillMode;

/// Synthetic in-situ simulation: fills a grid with an analytic field every
/// time step and publishes it to a visualization runtime.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "insitu-sim", version)]
pub struct Args {
    /// Cells per axis, e.g. `32,32,32`. Two values give a planar grid.
    #[arg(long, default_value = "50,50,50")]
    pub dims: String,

    /// Number of time steps to run.
    #[arg(long = "time_steps", default_value_t = 10)]
    pub time_steps: u64,

    /// Simulation time advanced per step.
    #[arg(long = "time_delta", default_value_t = 0.5, allow_negative_numbers = true)]
    pub time_delta: f64,

    /// Runtime to publish to (`trace` or `bov`).
    #[arg(long, default_value = "trace")]
    pub runtime: String,

    /// Output directory for file-writing runtimes.
    #[arg(long, default_value = ".")]
    pub output: PathBuf,

    /// Fill the grid with one task per Z slab.
    #[arg(long)]
    pub parallel: bool,

    /// Also synthesize the cell-centred field each step.
    #[arg(long = "synthesize-cells")]
    pub synthesize_cells: bool,
}

impl Args {
    /// Turn the parsed arguments into a validated [`SimConfig`].
    pub fn to_config(&self) -> Result<SimConfig, ConfigError> {
        let (dims, dimensionality) = parse_dims(&self.dims)?;
        let config = SimConfig {
            dims,
            dimensionality,
            time_steps: self.time_steps,
            time_delta: self.time_delta,
            fill_mode: if self.parallel {
                FillMode::Parallel
            } else {
                FillMode::Sequential
            },
            synthesize_cells: self.synthesize_cells,
            runtime_type: self.runtime.clone(),
            output_dir: self.output.clone(),
            ..SimConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
