//! Reusable synthesizers and configurations.
//!
//! - [`ConstantSynth`]: the same value everywhere, at all times.
//! - [`TimeSynth`]: the sample time, ignoring position.
//! - [`small_config`]: a [`SimConfig`] with the given dims and step count.

use insitu_engine::SimConfig;
use insitu_synth::Synthesizer;

/// Returns a fixed value.
pub struct ConstantSynth(pub f64);

impl Synthesizer for ConstantSynth {
    fn name(&self) -> &str {
        "constant"
    }

    fn sample(&self, _coord: [f64; 3], _time: f64) -> f64 {
        self.0
    }
}

/// Returns the sample time, so every vertex shows when it was written.
pub struct TimeSynth;

impl Synthesizer for TimeSynth {
    fn name(&self) -> &str {
        "time"
    }

    fn sample(&self, _coord: [f64; 3], time: f64) -> f64 {
        time
    }
}

/// Default configuration with `dims` cells and `time_steps` iterations.
pub fn small_config(dims: [i64; 3], time_steps: u64) -> SimConfig {
    SimConfig {
        dims,
        time_steps,
        ..SimConfig::default()
    }
}
