//! Test runtimes and fixtures for insitu development.
//!
//! [`RecordingRuntime`] implements [`Runtime`] and writes every call it
//! receives into a shared [`EventLog`], so a test can hand the runtime to a
//! [`TimeStepLoop`](insitu_engine::TimeStepLoop) and still inspect what
//! happened afterwards. It can be told to fail a given publish, refuse to
//! open, or play a script of commands back through
//! [`Runtime::poll`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use insitu_core::RuntimeError;
use insitu_engine::protocol::{action_names, NODAL_FIELD, ZONAL_FIELD};
use insitu_engine::{Control, DataProvider, Node, Runtime};

/// One call observed by a [`RecordingRuntime`].
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeEvent {
    Open {
        runtime_type: Option<String>,
    },
    Publish {
        cycle: i64,
        time: f64,
        info: Option<String>,
        /// Copy of the nodal field at publish time.
        nodal: Vec<f64>,
        /// Address of the nodal buffer, to check it is the grid's own.
        nodal_addr: usize,
        zonal_len: usize,
    },
    Execute {
        actions: Vec<String>,
    },
    Poll {
        blocking: bool,
        cycle: u64,
    },
    Close,
}

impl RuntimeEvent {
    /// Short name of the call (`"open"`, `"publish"`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Publish { .. } => "publish",
            Self::Execute { .. } => "execute",
            Self::Poll { .. } => "poll",
            Self::Close => "close",
        }
    }
}

/// Shared, cloneable event list.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<RuntimeEvent>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RuntimeEvent>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, event: RuntimeEvent) {
        self.lock().push(event);
    }

    /// Snapshot of every event so far.
    pub fn events(&self) -> Vec<RuntimeEvent> {
        self.lock().clone()
    }

    /// Call names in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.lock().iter().map(RuntimeEvent::kind).collect()
    }

    /// Number of events of one kind.
    pub fn count(&self, kind: &str) -> usize {
        self.lock().iter().filter(|e| e.kind() == kind).count()
    }

    /// Every publish event, in order.
    pub fn publishes(&self) -> Vec<RuntimeEvent> {
        self.lock()
            .iter()
            .filter(|e| matches!(e, RuntimeEvent::Publish { .. }))
            .cloned()
            .collect()
    }
}

/// What a scripted poll does.
#[derive(Clone, Debug, PartialEq)]
pub enum PollStep {
    /// Send these commands to the provider, then return `Continue`.
    Commands(Vec<&'static str>),
    /// Return `Terminate`.
    Terminate,
}

/// A [`Runtime`] that records every call.
#[derive(Debug)]
pub struct RecordingRuntime {
    log: EventLog,
    fail_open: bool,
    fail_publish_at: Option<usize>,
    publishes: usize,
    script: VecDeque<PollStep>,
}

impl RecordingRuntime {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_open: false,
            fail_publish_at: None,
            publishes: 0,
            script: VecDeque::new(),
        }
    }

    /// A runtime and the log it writes to.
    pub fn with_log() -> (Self, EventLog) {
        let log = EventLog::new();
        (Self::new(log.clone()), log)
    }

    /// Refuse to open a session.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Reject the `n`-th publish (1-based).
    pub fn failing_publish(mut self, n: usize) -> Self {
        self.fail_publish_at = Some(n);
        self
    }

    /// Play `steps` back, one per poll. Polls past the end continue.
    pub fn with_script(mut self, steps: impl IntoIterator<Item = PollStep>) -> Self {
        self.script = steps.into_iter().collect();
        self
    }

    /// Box as a trait object for [`TimeStepLoop::new`](insitu_engine::TimeStepLoop::new).
    pub fn boxed(self) -> Box<dyn Runtime> {
        Box::new(self)
    }
}

impl Runtime for RecordingRuntime {
    fn name(&self) -> &str {
        "recording"
    }

    fn open(&mut self, options: &Node<'_>) -> Result<(), RuntimeError> {
        self.log.push(RuntimeEvent::Open {
            runtime_type: options
                .get("runtime/type")
                .and_then(Node::as_text)
                .map(str::to_owned),
        });
        if self.fail_open {
            return Err(RuntimeError::SessionOpen {
                reason: "recording runtime told to fail".into(),
            });
        }
        Ok(())
    }

    fn publish(&mut self, data: &mut Node<'_>) -> Result<(), RuntimeError> {
        self.publishes += 1;
        let nodal = data
            .get(&format!("fields/{NODAL_FIELD}/values"))
            .and_then(Node::as_external);
        self.log.push(RuntimeEvent::Publish {
            cycle: data.get("state/cycle").and_then(Node::as_int).unwrap_or(-1),
            time: data.get("state/time").and_then(Node::as_float).unwrap_or(f64::NAN),
            info: data
                .get("state/info")
                .and_then(Node::as_text)
                .map(str::to_owned),
            nodal: nodal.map(|b| b.as_slice().to_vec()).unwrap_or_default(),
            nodal_addr: nodal.map_or(0, |b| b.as_ptr() as usize),
            zonal_len: data
                .get(&format!("fields/{ZONAL_FIELD}/values"))
                .and_then(Node::as_external)
                .map_or(0, |b| b.len()),
        });
        if self.fail_publish_at == Some(self.publishes) {
            return Err(RuntimeError::Rejected {
                call: "publish".into(),
                reason: format!("publish {} rejected", self.publishes),
            });
        }
        Ok(())
    }

    fn execute(&mut self, actions: &Node<'_>) -> Result<(), RuntimeError> {
        self.log.push(RuntimeEvent::Execute {
            actions: action_names(actions).into_iter().map(str::to_owned).collect(),
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), RuntimeError> {
        self.log.push(RuntimeEvent::Close);
        Ok(())
    }

    fn poll(
        &mut self,
        provider: &mut dyn DataProvider,
        blocking: bool,
    ) -> Result<Control, RuntimeError> {
        self.log.push(RuntimeEvent::Poll {
            blocking,
            cycle: provider.metadata().cycle.0,
        });
        match self.script.pop_front() {
            Some(PollStep::Terminate) => Ok(Control::Terminate),
            Some(PollStep::Commands(commands)) => {
                for name in commands {
                    provider
                        .on_command(name)
                        .map_err(|e| RuntimeError::Rejected {
                            call: "poll".into(),
                            reason: e.to_string(),
                        })?;
                }
                Ok(Control::Continue)
            }
            // A blocking poll with nothing left to say would hang forever.
            None if blocking => {
                provider
                    .on_command("run")
                    .map_err(|e| RuntimeError::Rejected {
                        call: "poll".into(),
                        reason: e.to_string(),
                    })?;
                Ok(Control::Continue)
            }
            None => Ok(Control::Continue),
        }
    }
}
