//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input to [`TimeStepLoop::new`](crate::TimeStepLoop::new).
//! [`validate()`](SimConfig::validate) checks it up front so that a bad
//! setting fails before any buffer is allocated or session opened.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use insitu_core::GridError;
use insitu_grid::{Dimensionality, GridSpec};
use insitu_synth::FillMode;

/// Runtime names accepted by [`builtin::create`](crate::builtin::create).
pub const RUNTIME_TYPES: [&str; 2] = ["trace", "bov"];

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`SimConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The grid description is invalid.
    Grid(GridError),
    /// `time_delta` is NaN or infinite.
    InvalidTimeDelta {
        /// The configured value.
        value: f64,
    },
    /// A `--dims` string could not be parsed.
    InvalidDims {
        /// The text as given.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
    /// No built-in runtime has this name.
    UnknownRuntime {
        /// The requested name.
        name: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::InvalidTimeDelta { value } => {
                write!(f, "time_delta must be finite, got {value}")
            }
            Self::InvalidDims { input, reason } => {
                write!(f, "invalid dims '{input}': {reason}")
            }
            Self::UnknownRuntime { name } => write!(
                f,
                "unknown runtime '{name}' (expected one of: {})",
                RUNTIME_TYPES.join(", ")
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Everything needed to build and drive a [`TimeStepLoop`](crate::TimeStepLoop).
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Cell counts per axis. For a planar run the Z entry is ignored.
    pub dims: [i64; 3],
    /// Volume or planar grid.
    pub dimensionality: Dimensionality,
    /// Number of iterations before the loop finishes.
    pub time_steps: u64,
    /// Simulation time advanced per iteration.
    pub time_delta: f64,
    /// How the synthesis pass distributes work.
    pub fill_mode: FillMode,
    /// Also refresh the cell field each step. Off by default: the cell
    /// buffer keeps its initial zeros.
    pub synthesize_cells: bool,
    /// Name of the built-in runtime to publish to.
    pub runtime_type: String,
    /// Directory for file-writing runtimes.
    pub output_dir: PathBuf,
    /// Free text published as `state/info`.
    pub info: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dims: [50, 50, 50],
            dimensionality: Dimensionality::Volume,
            time_steps: 10,
            time_delta: 0.5,
            fill_mode: FillMode::Sequential,
            synthesize_cells: false,
            runtime_type: "trace".to_owned(),
            output_dir: PathBuf::from("."),
            info: "Pseudocolor of random math function".to_owned(),
        }
    }
}

impl SimConfig {
    /// Check the grid and clock settings.
    ///
    /// `runtime_type` is not checked here: a caller may hand the loop its
    /// own runtime and use the name only as a label. Zero `time_steps` is
    /// allowed: the loop opens and closes its session without publishing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid_spec()?;
        if !self.time_delta.is_finite() {
            return Err(ConfigError::InvalidTimeDelta {
                value: self.time_delta,
            });
        }
        Ok(())
    }

    /// The grid described by this configuration.
    pub fn grid_spec(&self) -> Result<GridSpec, ConfigError> {
        let spec = match self.dimensionality {
            Dimensionality::Planar => GridSpec::planar(
                [self.dims[0], self.dims[1]],
                self.time_steps,
                self.time_delta,
            )?,
            Dimensionality::Volume => {
                GridSpec::new(self.dims, self.time_steps, self.time_delta)?
            }
        };
        Ok(spec)
    }
}

/// Parse a comma-separated cell count list such as `"32,32,32"`.
///
/// Two values select a planar grid; three select a volume.
pub fn parse_dims(input: &str) -> Result<([i64; 3], Dimensionality), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDims {
        input: input.to_owned(),
        reason,
    };
    let values = input
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<i64>()
                .map_err(|e| invalid(format!("'{part}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values[..] {
        [x, y] => Ok(([x, y, 1], Dimensionality::Planar)),
        [x, y, z] => Ok(([x, y, z], Dimensionality::Volume)),
        _ => Err(invalid(format!("expected 2 or 3 values, got {}", values.len()))),
    }
}

impl fmt::Display for SimConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.dims;
        match self.dimensionality {
            Dimensionality::Planar => writeln!(f, "dims       : ({x}, {y})")?,
            Dimensionality::Volume => writeln!(f, "dims       : ({x}, {y}, {z})")?,
        }
        writeln!(f, "time steps : {}", self.time_steps)?;
        writeln!(f, "time delta : {}", self.time_delta)?;
        writeln!(f, "fill mode  : {:?}", self.fill_mode)?;
        writeln!(f, "cells      : {}", if self.synthesize_cells { "synthesized" } else { "static" })?;
        writeln!(f, "runtime    : {}", self.runtime_type)?;
        write!(f, "output     : {}", self.output_dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insitu_core::Axis;

    #[test]
    fn default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        let spec = config.grid_spec().unwrap();
        assert_eq!(spec.dims(), [50, 50, 50]);
        assert_eq!(spec.spacing(), [0.2, 0.2, 0.2]);
        assert_eq!(spec.time_steps(), 10);
    }

    #[test]
    fn zero_dimension_rejected() {
        let config = SimConfig {
            dims: [4, 0, 4],
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Grid(GridError::InvalidDimension {
                axis: Axis::Y,
                value: 0
            }))
        );
    }

    #[test]
    fn planar_ignores_z() {
        let config = SimConfig {
            dims: [8, 4, -3],
            dimensionality: Dimensionality::Planar,
            ..SimConfig::default()
        };
        let spec = config.grid_spec().unwrap();
        assert_eq!(spec.dims(), [8, 4, 1]);
        assert!(spec.is_planar());
    }

    #[test]
    fn non_finite_time_delta_rejected() {
        let config = SimConfig {
            time_delta: f64::INFINITY,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeDelta { .. })
        ));
    }

    #[test]
    fn unknown_runtime_message_lists_choices() {
        let err = ConfigError::UnknownRuntime {
            name: "catalyst".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unknown runtime 'catalyst' (expected one of: trace, bov)"
        );
    }

    #[test]
    fn parse_dims_volume_and_planar() {
        assert_eq!(
            parse_dims("32,32,32").unwrap(),
            ([32, 32, 32], Dimensionality::Volume)
        );
        assert_eq!(
            parse_dims("16, 8").unwrap(),
            ([16, 8, 1], Dimensionality::Planar)
        );
    }

    #[test]
    fn parse_dims_rejects_garbage() {
        assert!(matches!(
            parse_dims("4,x,4"),
            Err(ConfigError::InvalidDims { .. })
        ));
        assert!(matches!(
            parse_dims("4"),
            Err(ConfigError::InvalidDims { .. })
        ));
        assert!(matches!(
            parse_dims("1,2,3,4"),
            Err(ConfigError::InvalidDims { .. })
        ));
    }

    #[test]
    fn display_lists_settings() {
        let text = SimConfig::default().to_string();
        assert!(text.contains("(50, 50, 50)"));
        assert!(text.contains("time delta : 0.5"));
        assert!(text.contains("runtime    : trace"));
    }

    #[test]
    fn grid_error_is_source() {
        let err = ConfigError::from(GridError::InvalidDimension {
            axis: Axis::X,
            value: -1,
        });
        assert!(err.source().is_some());
    }
}
