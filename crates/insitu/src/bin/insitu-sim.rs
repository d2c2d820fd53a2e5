//! Run the synthetic simulation against a built-in runtime.
//!
//! Usage: `insitu-sim [--dims=32,32,32] [--time_steps=10] [--time_delta=0.5]
//! [--runtime trace|bov] [--output DIR] [--parallel] [--synthesize-cells]`

use std::process;

use clap::Parser;
use tracing::{error, info};

use insitu::cli::Args;
use insitu::engine::{builtin, TimeStepLoop};
use insitu::synth::VelocityMagnitude;

fn main() {
    insitu::init_logging();

    let args = Args::parse();
    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(2);
        }
    };
    for line in config.to_string().lines() {
        info!("{line}");
    }

    let runtime = match builtin::create(&config.runtime_type, &config.output_dir) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{e}");
            process::exit(2);
        }
    };

    let mut sim = match TimeStepLoop::new(&config, Box::new(VelocityMagnitude), runtime) {
        Ok(sim) => sim,
        Err(e) => {
            error!("failed to start: {e}");
            process::exit(1);
        }
    };

    match sim.run() {
        Ok(summary) => info!(
            steps = summary.steps,
            final_time = summary.final_time,
            reason = ?summary.reason,
            "done"
        ),
        Err(e) => {
            error!("simulation stopped: {e}");
            process::exit(1);
        }
    }
}
