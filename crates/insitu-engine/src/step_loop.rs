//! The time-step loop.
//!
//! [`TimeStepLoop`] is the single owner of the grid. Each
//! [`step()`](TimeStepLoop::step) advances the clock, refills the buffers
//! at the new time, and hands them to the runtime:
//!
//! 1. `time += time_delta`, `cycle += 1`
//! 2. fill every vertex (and, if enabled, every cell) at `time`
//! 3. `publish(mesh)`, `execute(scene actions)`, `execute(reset)`
//!
//! The published `state/time` is therefore always the time the values
//! were sampled at. The mesh document borrows the grid, so step 3 must
//! return before anything can write the buffers again.
//!
//! # States
//!
//! `Idle` until the first step, `Stepping` while iterations remain, and
//! `Done` once `time_steps` iterations have run, the runtime asked to
//! terminate, or a runtime call failed. Reaching `Done` closes the
//! session; a failed call never leaves a half-published step behind
//! because publication starts only after the fill has completed.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use insitu_core::{Axis, Cycle, DomainId, GridError, RuntimeError};
use insitu_grid::{Dimensionality, FieldGrid, GridSpec, SubDomain};
use insitu_synth::{fill_cells, fill_points, FillMode, Synthesizer};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimConfig};
use crate::document::Node;
use crate::metrics::{elapsed_us, StepMetrics};
use crate::protocol::{mesh_document, reset_actions, scene_actions, session_options, PublishState};
use crate::provider::{
    ControlCommand, DataProvider, MeshMetadata, ProviderError, RectilinearMesh, RunMode,
    SimulationMetadata, VariableMetadata, NODAL_VARIABLE, ZONAL_VARIABLE,
};
use crate::runtime::{Control, Runtime, Session};

// Compile-time assertion: the loop can move to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<TimeStepLoop>();
    }
};

// ── States and reports ─────────────────────────────────────────────

/// Lifecycle of a [`TimeStepLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, no step taken yet.
    Idle,
    /// At least one step taken, more remain.
    Stepping,
    /// Finished; the session is closed.
    Done,
}

/// Why [`TimeStepLoop::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// All `time_steps` iterations ran.
    Completed,
    /// The runtime asked the loop to stop.
    Terminated,
}

/// Outcome of one successful [`TimeStepLoop::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Cycle published by this step.
    pub cycle: Cycle,
    /// Time the values were sampled at.
    pub time: f64,
    /// Timing for this step.
    pub metrics: StepMetrics,
}

/// Outcome of [`TimeStepLoop::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Iterations completed over the loop's lifetime.
    pub steps: u64,
    /// Last published cycle.
    pub cycle: Cycle,
    /// Simulation time after the last iteration.
    pub final_time: f64,
    /// Why the loop stopped.
    pub reason: StopReason,
}

// ── StepError ──────────────────────────────────────────────────────

/// Errors from building or driving a [`TimeStepLoop`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The configuration is invalid.
    Config(ConfigError),
    /// The grid could not be built.
    Grid(GridError),
    /// The runtime failed; the loop is now `Done`.
    Runtime(RuntimeError),
    /// The loop already reached `Done`.
    Finished,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Runtime(e) => write!(f, "runtime: {e}"),
            Self::Finished => write!(f, "time-step loop has finished"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::Runtime(e) => Some(e),
            Self::Finished => None,
        }
    }
}

impl From<ConfigError> for StepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<GridError> for StepError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<RuntimeError> for StepError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

// ── SimState ───────────────────────────────────────────────────────

/// The part of the loop a polling runtime may see and steer.
struct SimState {
    grid: FieldGrid,
    time: f64,
    cycle: Cycle,
    run_mode: RunMode,
    pending_steps: u64,
}

impl SimState {
    fn mesh_name(&self) -> &'static str {
        match self.grid.dimensionality() {
            Dimensionality::Planar => "mesh2d",
            Dimensionality::Volume => "mesh3d",
        }
    }

    fn check_domain(domain: DomainId) -> Result<(), ProviderError> {
        if domain == DomainId::ROOT {
            Ok(())
        } else {
            Err(ProviderError::UnknownDomain { domain })
        }
    }
}

impl DataProvider for SimState {
    fn metadata(&self) -> SimulationMetadata {
        let rank = self.grid.dimensionality().rank();
        let mesh = self.mesh_name().to_owned();
        SimulationMetadata {
            mode: self.run_mode,
            cycle: self.cycle,
            time: self.time,
            meshes: vec![MeshMetadata {
                name: mesh.clone(),
                mesh_type: "rectilinear",
                spatial_dimension: rank,
                domains: 1,
                units: vec!["cm"; rank],
                labels: ["Width", "Height", "Length"][..rank].to_vec(),
            }],
            variables: vec![
                VariableMetadata {
                    name: NODAL_VARIABLE,
                    mesh: mesh.clone(),
                    centering: insitu_core::Association::Vertex,
                },
                VariableMetadata {
                    name: ZONAL_VARIABLE,
                    mesh,
                    centering: insitu_core::Association::Element,
                },
            ],
            commands: ControlCommand::ALL.to_vec(),
        }
    }

    fn mesh(&self, domain: DomainId) -> Result<RectilinearMesh, ProviderError> {
        Self::check_domain(domain)?;
        let z = match self.grid.dimensionality() {
            Dimensionality::Planar => Vec::new(),
            Dimensionality::Volume => self.grid.axis_coords(Axis::Z),
        };
        Ok(RectilinearMesh {
            x: self.grid.axis_coords(Axis::X),
            y: self.grid.axis_coords(Axis::Y),
            z,
        })
    }

    fn variable(&self, domain: DomainId, name: &str) -> Result<&[f64], ProviderError> {
        Self::check_domain(domain)?;
        match name {
            NODAL_VARIABLE => Ok(self.grid.point_values()),
            ZONAL_VARIABLE => Ok(self.grid.cell_values()),
            _ => Err(ProviderError::UnknownVariable {
                name: name.to_owned(),
            }),
        }
    }

    fn on_command(&mut self, name: &str) -> Result<(), ProviderError> {
        let command = name.parse::<ControlCommand>().inspect_err(|_| {
            warn!(command = name, "ignoring unknown command");
        })?;
        match command {
            ControlCommand::Halt => self.run_mode = RunMode::Stopped,
            ControlCommand::Step => {
                if self.run_mode == RunMode::Stopped {
                    self.pending_steps += 1;
                }
            }
            ControlCommand::Run => {
                self.run_mode = RunMode::Running;
                self.pending_steps = 0;
            }
        }
        debug!(%command, mode = ?self.run_mode, "command applied");
        Ok(())
    }
}

// ── TimeStepLoop ───────────────────────────────────────────────────

/// Drives synthesis and publication for one sub-domain.
///
/// # Example
///
/// ```ignore
/// let runtime = insitu_engine::builtin::create("trace", Path::new("."))?;
/// let mut sim = TimeStepLoop::new(&SimConfig::default(), Box::new(VelocityMagnitude), runtime)?;
/// let summary = sim.run()?;
/// assert_eq!(summary.reason, StopReason::Completed);
/// ```
pub struct TimeStepLoop {
    sim: SimState,
    spec: GridSpec,
    synthesizer: Box<dyn Synthesizer>,
    session: Session,
    fill_mode: FillMode,
    synthesize_cells: bool,
    info: String,
    actions: Node<'static>,
    reset: Node<'static>,
    state: LoopState,
    steps_done: u64,
}

impl TimeStepLoop {
    /// Validate `config`, allocate the whole-grid [`FieldGrid`], and open
    /// a session on `runtime`.
    ///
    /// The grid is allocated before the session opens, so a grid error
    /// never leaves a session behind.
    pub fn new(
        config: &SimConfig,
        synthesizer: Box<dyn Synthesizer>,
        runtime: Box<dyn Runtime>,
    ) -> Result<Self, StepError> {
        config.validate()?;
        let spec = config.grid_spec()?;
        let grid = FieldGrid::new(&spec, &SubDomain::whole(&spec))?;
        info!(
            dims = ?spec.dims(),
            spacing = ?spec.spacing(),
            time_steps = spec.time_steps(),
            time_delta = spec.time_delta(),
            synthesizer = synthesizer.name(),
            "grid allocated"
        );

        let session = Session::open(runtime, &session_options(&config.runtime_type))?;

        Ok(Self {
            sim: SimState {
                grid,
                time: 0.0,
                cycle: Cycle::default(),
                run_mode: RunMode::Running,
                pending_steps: 0,
            },
            spec,
            synthesizer,
            session,
            fill_mode: config.fill_mode,
            synthesize_cells: config.synthesize_cells,
            info: config.info.clone(),
            actions: scene_actions(),
            reset: reset_actions(),
            state: LoopState::Idle,
            steps_done: 0,
        })
    }

    /// Run one iteration.
    ///
    /// The clock advances before the fill, so the first step samples at
    /// `time_delta` and `t = 0` is never sampled.
    ///
    /// # Errors
    ///
    /// [`StepError::Finished`] once the loop is `Done`;
    /// [`StepError::Runtime`] if the runtime rejected the step, after which
    /// the loop is `Done` and the session closed.
    pub fn step(&mut self) -> Result<StepReport, StepError> {
        if self.state == LoopState::Done {
            return Err(StepError::Finished);
        }
        if self.steps_done >= self.spec.time_steps() {
            self.finish();
            return Err(StepError::Finished);
        }
        self.state = LoopState::Stepping;
        let started = Instant::now();

        self.sim.time += self.spec.time_delta();
        self.sim.cycle = self.sim.cycle.next();

        let synth_start = Instant::now();
        let synth = self.synthesizer.as_ref();
        fill_points(&mut self.sim.grid, synth, self.sim.time, self.fill_mode);
        if self.synthesize_cells {
            fill_cells(&mut self.sim.grid, synth, self.sim.time, self.fill_mode);
        }
        let synthesis_us = elapsed_us(synth_start);

        let publish_start = Instant::now();
        if let Err(e) = self.publish() {
            warn!(cycle = %self.sim.cycle, error = %e, "runtime failed, stopping");
            self.finish();
            return Err(e.into());
        }
        let publish_us = elapsed_us(publish_start);

        self.steps_done += 1;
        let report = StepReport {
            cycle: self.sim.cycle,
            time: self.sim.time,
            metrics: StepMetrics {
                total_us: elapsed_us(started),
                synthesis_us,
                publish_us,
                point_count: self.sim.grid.point_count(),
            },
        };
        debug!(
            cycle = %report.cycle,
            time = report.time,
            synthesis_us,
            publish_us,
            "step published"
        );

        if self.steps_done >= self.spec.time_steps() {
            self.finish();
        }
        Ok(report)
    }

    /// Run until `time_steps` iterations have completed or the runtime
    /// terminates the loop.
    ///
    /// Before every iteration the runtime is polled. While the run mode is
    /// [`RunMode::Stopped`] the poll blocks, and an iteration only happens
    /// after a `step` or `run` command.
    pub fn run(&mut self) -> Result<RunSummary, StepError> {
        if self.state == LoopState::Done {
            return Err(StepError::Finished);
        }
        info!(
            time_steps = self.spec.time_steps(),
            runtime = self.session.runtime_name(),
            "run started"
        );

        let mut reason = StopReason::Completed;
        while self.steps_done < self.spec.time_steps() {
            if self.await_go()? == Control::Terminate {
                info!(cycle = %self.sim.cycle, "runtime requested termination");
                reason = StopReason::Terminated;
                break;
            }
            self.step()?;
        }
        self.finish();

        let summary = RunSummary {
            steps: self.steps_done,
            cycle: self.sim.cycle,
            final_time: self.sim.time,
            reason,
        };
        info!(
            steps = summary.steps,
            final_time = summary.final_time,
            reason = ?summary.reason,
            "run finished"
        );
        Ok(summary)
    }

    /// Poll until the loop may take its next iteration or must stop.
    fn await_go(&mut self) -> Result<Control, StepError> {
        loop {
            let blocking = self.sim.run_mode == RunMode::Stopped && self.sim.pending_steps == 0;
            let control = match self.session.poll(&mut self.sim, blocking) {
                Ok(control) => control,
                Err(e) => {
                    warn!(error = %e, "poll failed, stopping");
                    self.finish();
                    return Err(e.into());
                }
            };
            if control == Control::Terminate {
                return Ok(Control::Terminate);
            }
            match self.sim.run_mode {
                RunMode::Running => return Ok(Control::Continue),
                RunMode::Stopped if self.sim.pending_steps > 0 => {
                    self.sim.pending_steps -= 1;
                    return Ok(Control::Continue);
                }
                RunMode::Stopped => {}
            }
        }
    }

    fn publish(&mut self) -> Result<(), RuntimeError> {
        let state = PublishState {
            time: self.sim.time,
            cycle: self.sim.cycle,
            domain: DomainId::ROOT,
            info: &self.info,
        };
        let mut mesh = mesh_document(&mut self.sim.grid, &state);
        self.session.publish(&mut mesh)?;
        self.session.execute(&self.actions)?;
        self.session.execute(&self.reset)?;
        Ok(())
    }

    /// Enter `Done` and close the session, logging a close failure.
    fn finish(&mut self) {
        self.state = LoopState::Done;
        if let Err(e) = self.session.close() {
            warn!(error = %e, "session close failed");
        }
    }

    /// Stop the loop and close the session.
    ///
    /// Idempotent: only the first call reaches the runtime.
    pub fn close(&mut self) -> Result<(), StepError> {
        self.state = LoopState::Done;
        self.session.close()?;
        Ok(())
    }

    /// Apply a generic command as if the runtime had sent it.
    pub fn command(&mut self, name: &str) -> Result<(), ProviderError> {
        self.sim.on_command(name)
    }

    /// The loop's view as a [`DataProvider`].
    pub fn provider(&mut self) -> &mut dyn DataProvider {
        &mut self.sim
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Time of the most recent sample (0 before the first step).
    pub fn current_time(&self) -> f64 {
        self.sim.time
    }

    /// Number of published steps.
    pub fn cycle(&self) -> Cycle {
        self.sim.cycle
    }

    /// Iterations completed so far.
    pub fn steps_done(&self) -> u64 {
        self.steps_done
    }

    /// The owned grid.
    pub fn grid(&self) -> &FieldGrid {
        &self.sim.grid
    }

    /// The global grid description.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Whether the loop free-runs or waits for commands.
    pub fn run_mode(&self) -> RunMode {
        self.sim.run_mode
    }

    /// Whether the runtime session is still open.
    pub fn session_open(&self) -> bool {
        self.session.is_open()
    }
}

impl fmt::Debug for TimeStepLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeStepLoop")
            .field("state", &self.state)
            .field("cycle", &self.sim.cycle)
            .field("time", &self.sim.time)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
