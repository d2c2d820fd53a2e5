//! Pull-side interface offered to an interactive runtime.
//!
//! While the loop waits between iterations it hands the runtime a
//! [`DataProvider`] through [`Runtime::poll`](crate::Runtime::poll). The
//! runtime can read metadata, mesh geometry, and field values, and can
//! issue the generic commands `halt`, `step`, and `run`.

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use insitu_core::{Association, Cycle, DomainId};

/// Name of the vertex-centred variable served to the runtime.
pub const NODAL_VARIABLE: &str = "nodal";
/// Name of the cell-centred variable served to the runtime.
pub const ZONAL_VARIABLE: &str = "zonal";

/// Whether the loop advances on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Iterations follow each other without waiting for input.
    #[default]
    Running,
    /// The loop blocks on the runtime until told to step or run.
    Stopped,
}

/// A generic command a runtime may send to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCommand {
    /// Pause before the next iteration.
    Halt,
    /// Perform exactly one iteration, then stay paused.
    Step,
    /// Resume free running.
    Run,
}

impl ControlCommand {
    /// Every command, in the order they are advertised.
    pub const ALL: [ControlCommand; 3] = [Self::Halt, Self::Step, Self::Run];

    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Step => "step",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlCommand {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ProviderError::UnknownCommand {
                name: s.to_owned(),
            })
    }
}

// ── Metadata ───────────────────────────────────────────────────────

/// Description of one mesh offered to the runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshMetadata {
    /// Mesh name (`mesh3d` or `mesh2d`).
    pub name: String,
    /// Always `"rectilinear"`.
    pub mesh_type: &'static str,
    /// Number of spatial axes.
    pub spatial_dimension: usize,
    /// Number of domains the mesh is split into.
    pub domains: u32,
    /// Unit label per axis.
    pub units: Vec<&'static str>,
    /// Axis labels.
    pub labels: Vec<&'static str>,
}

/// Description of one scalar variable.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableMetadata {
    /// Variable name.
    pub name: &'static str,
    /// Mesh the variable lives on.
    pub mesh: String,
    /// Vertex- or cell-centred.
    pub centering: Association,
}

/// Snapshot of what the simulation can serve.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationMetadata {
    /// Current run mode.
    pub mode: RunMode,
    /// Completed iterations.
    pub cycle: Cycle,
    /// Current simulation time.
    pub time: f64,
    /// Available meshes.
    pub meshes: Vec<MeshMetadata>,
    /// Available variables.
    pub variables: Vec<VariableMetadata>,
    /// Commands accepted by [`DataProvider::on_command`].
    pub commands: Vec<ControlCommand>,
}

/// Per-axis coordinate arrays of a rectilinear mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct RectilinearMesh {
    /// X coordinates.
    pub x: Vec<f64>,
    /// Y coordinates.
    pub y: Vec<f64>,
    /// Z coordinates. Empty for a planar mesh.
    pub z: Vec<f64>,
}

impl RectilinearMesh {
    /// Number of vertices described.
    pub fn point_count(&self) -> usize {
        self.x.len() * self.y.len() * self.z.len().max(1)
    }
}

// ── ProviderError ──────────────────────────────────────────────────

/// Requests a [`DataProvider`] cannot satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderError {
    /// No such domain in this process.
    UnknownDomain {
        /// The requested domain.
        domain: DomainId,
    },
    /// No variable of this name.
    UnknownVariable {
        /// The requested name.
        name: String,
    },
    /// Not one of `halt`, `step`, `run`.
    UnknownCommand {
        /// The received command.
        name: String,
    },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDomain { domain } => write!(f, "unknown domain {domain}"),
            Self::UnknownVariable { name } => write!(f, "unknown variable '{name}'"),
            Self::UnknownCommand { name } => write!(f, "unknown command '{name}'"),
        }
    }
}

impl Error for ProviderError {}

/// What the simulation answers when a runtime polls it.
pub trait DataProvider {
    /// Current mode, clock, and the meshes, variables, and commands on offer.
    fn metadata(&self) -> SimulationMetadata;

    /// Coordinates of the mesh on `domain`.
    fn mesh(&self, domain: DomainId) -> Result<RectilinearMesh, ProviderError>;

    /// Flat values of variable `name` on `domain`, z/y/x order.
    fn variable(&self, domain: DomainId, name: &str) -> Result<&[f64], ProviderError>;

    /// Apply a generic command by name.
    fn on_command(&mut self, name: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_by_name() {
        assert_eq!("halt".parse::<ControlCommand>(), Ok(ControlCommand::Halt));
        assert_eq!("step".parse::<ControlCommand>(), Ok(ControlCommand::Step));
        assert_eq!("run".parse::<ControlCommand>(), Ok(ControlCommand::Run));
        assert_eq!(
            "quit".parse::<ControlCommand>(),
            Err(ProviderError::UnknownCommand {
                name: "quit".to_owned()
            })
        );
    }

    #[test]
    fn command_names_round_trip() {
        for c in ControlCommand::ALL {
            assert_eq!(c.to_string().parse::<ControlCommand>(), Ok(c));
        }
    }

    #[test]
    fn planar_mesh_point_count() {
        let mesh = RectilinearMesh {
            x: vec![0.0, 1.0, 2.0],
            y: vec![0.0, 1.0],
            z: Vec::new(),
        };
        assert_eq!(mesh.point_count(), 6);
    }

    #[test]
    fn default_mode_is_running() {
        assert_eq!(RunMode::default(), RunMode::Running);
    }
}
