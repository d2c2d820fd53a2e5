//! Runtimes that ship with the engine, selected by name.
//!
//! - `"trace"`: [`TraceRuntime`] logs a one-line summary per publish.
//! - `"bov"`: [`BovRuntime`] writes the nodal field of every publish as a
//!   BOV dataset.

use std::path::{Path, PathBuf};

use insitu_core::RuntimeError;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::document::Node;
use crate::export::{write_bov, BovBrick};
use crate::protocol::{action_names, NODAL_FIELD};
use crate::runtime::Runtime;

/// Build the runtime registered under `name`.
pub fn create(name: &str, output_dir: &Path) -> Result<Box<dyn Runtime>, ConfigError> {
    match name {
        "trace" => Ok(Box::new(TraceRuntime::default())),
        "bov" => Ok(Box::new(BovRuntime::new(output_dir))),
        _ => Err(ConfigError::UnknownRuntime {
            name: name.to_owned(),
        }),
    }
}

fn cycle_of(data: &Node<'_>) -> i64 {
    data.get("state/cycle").and_then(Node::as_int).unwrap_or(0)
}

fn nodal_values<'n>(data: &'n Node<'_>) -> Result<&'n [f64], RuntimeError> {
    data.get(&format!("fields/{NODAL_FIELD}/values"))
        .and_then(Node::as_external)
        .map(|buf| buf.as_slice())
        .ok_or_else(|| RuntimeError::Rejected {
            call: "publish".into(),
            reason: format!("no external values for field '{NODAL_FIELD}'"),
        })
}

// ── TraceRuntime ───────────────────────────────────────────────────

/// Logs each published step through `tracing`.
#[derive(Debug, Default)]
pub struct TraceRuntime {
    publishes: u64,
}

impl TraceRuntime {
    /// Number of documents published so far.
    pub fn publishes(&self) -> u64 {
        self.publishes
    }
}

impl Runtime for TraceRuntime {
    fn name(&self) -> &str {
        "trace"
    }

    fn open(&mut self, options: &Node<'_>) -> Result<(), RuntimeError> {
        let kind = options.get("runtime/type").and_then(Node::as_text);
        info!(runtime_type = kind.unwrap_or("?"), "trace runtime ready");
        Ok(())
    }

    fn publish(&mut self, data: &mut Node<'_>) -> Result<(), RuntimeError> {
        let values = nodal_values(data)?;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let time = data.get("state/time").and_then(Node::as_float).unwrap_or(0.0);
        info!(cycle = cycle_of(data), time, min, max, points = values.len(), "publish");
        self.publishes += 1;
        Ok(())
    }

    fn execute(&mut self, actions: &Node<'_>) -> Result<(), RuntimeError> {
        debug!(actions = ?action_names(actions), "execute");
        Ok(())
    }

    fn close(&mut self) -> Result<(), RuntimeError> {
        info!(publishes = self.publishes, "trace runtime closed");
        Ok(())
    }
}

// ── BovRuntime ─────────────────────────────────────────────────────

/// Writes `<dir>/<prefix>_<cycle>` and its `.bov` header per publish.
#[derive(Debug)]
pub struct BovRuntime {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl BovRuntime {
    /// Write into `dir` with the default `nodal_noise` prefix.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_prefix(dir, NODAL_FIELD)
    }

    /// Write into `dir` with file names starting `prefix`.
    pub fn with_prefix(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    /// Header files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Runtime for BovRuntime {
    fn name(&self) -> &str {
        "bov"
    }

    fn open(&mut self, _options: &Node<'_>) -> Result<(), RuntimeError> {
        std::fs::create_dir_all(&self.dir)?;
        info!(dir = %self.dir.display(), "bov runtime writing");
        Ok(())
    }

    fn publish(&mut self, data: &mut Node<'_>) -> Result<(), RuntimeError> {
        let brick = BovBrick::from_document(data, NODAL_FIELD)?;
        let prefix = format!("{}_{:04}", self.prefix, cycle_of(data));
        let header = write_bov(&self.dir, &prefix, NODAL_FIELD, &brick)?;
        debug!(header = %header.display(), "bov written");
        self.written.push(header);
        Ok(())
    }

    fn execute(&mut self, _actions: &Node<'_>) -> Result<(), RuntimeError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), RuntimeError> {
        info!(files = self.written.len(), "bov runtime closed");
        Ok(())
    }
}
