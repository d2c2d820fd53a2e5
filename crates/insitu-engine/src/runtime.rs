//! The visualization runtime boundary.
//!
//! A [`Runtime`] consumes published mesh documents and action lists. The
//! loop never talks to one directly: it wraps it in a [`Session`], which
//! guarantees `close` runs exactly once after a successful `open`, even
//! if the loop is dropped mid-run.

use insitu_core::RuntimeError;
use tracing::{info, warn};

use crate::document::Node;
use crate::provider::DataProvider;

/// What the runtime wants after a poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Carry on with the next iteration.
    Continue,
    /// Stop the loop now.
    Terminate,
}

/// A visualization runtime that accepts published data.
///
/// All calls happen on the loop's thread. The document passed to
/// [`publish`](Runtime::publish) borrows the grid's buffers; they stay
/// untouched until both subsequent [`execute`](Runtime::execute) calls
/// have returned.
pub trait Runtime: Send {
    /// Name used in log output.
    fn name(&self) -> &str;

    /// Start a session. `options` carries `runtime/type`.
    fn open(&mut self, options: &Node<'_>) -> Result<(), RuntimeError>;

    /// Accept the current mesh document.
    fn publish(&mut self, data: &mut Node<'_>) -> Result<(), RuntimeError>;

    /// Run an action list against the last published data.
    fn execute(&mut self, actions: &Node<'_>) -> Result<(), RuntimeError>;

    /// End the session.
    fn close(&mut self) -> Result<(), RuntimeError>;

    /// Give the runtime a chance to inspect the simulation and send
    /// commands between iterations.
    ///
    /// With `blocking` set the simulation is paused and the runtime should
    /// wait for input. Runtimes with no interactive side return
    /// [`Control::Continue`].
    fn poll(
        &mut self,
        provider: &mut dyn DataProvider,
        blocking: bool,
    ) -> Result<Control, RuntimeError> {
        let _ = (provider, blocking);
        Ok(Control::Continue)
    }
}

impl<R: Runtime + ?Sized> Runtime for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self, options: &Node<'_>) -> Result<(), RuntimeError> {
        (**self).open(options)
    }

    fn publish(&mut self, data: &mut Node<'_>) -> Result<(), RuntimeError> {
        (**self).publish(data)
    }

    fn execute(&mut self, actions: &Node<'_>) -> Result<(), RuntimeError> {
        (**self).execute(actions)
    }

    fn close(&mut self) -> Result<(), RuntimeError> {
        (**self).close()
    }

    fn poll(
        &mut self,
        provider: &mut dyn DataProvider,
        blocking: bool,
    ) -> Result<Control, RuntimeError> {
        (**self).poll(provider, blocking)
    }
}

// ── Session ────────────────────────────────────────────────────────

/// An open runtime session.
///
/// Every call after [`close`](Session::close) fails with
/// [`RuntimeError::SessionClosed`]. Dropping an open session closes it
/// and logs any error.
pub struct Session {
    runtime: Box<dyn Runtime>,
    open: bool,
}

impl Session {
    /// Open `runtime` with `options`.
    ///
    /// On failure the runtime is dropped without a `close` call.
    pub fn open(mut runtime: Box<dyn Runtime>, options: &Node<'_>) -> Result<Self, RuntimeError> {
        runtime.open(options)?;
        info!(runtime = runtime.name(), "session opened");
        Ok(Self {
            runtime,
            open: true,
        })
    }

    /// Whether `close` has not yet run.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Name of the wrapped runtime.
    pub fn runtime_name(&self) -> &str {
        self.runtime.name()
    }

    /// Forward to [`Runtime::publish`].
    pub fn publish(&mut self, data: &mut Node<'_>) -> Result<(), RuntimeError> {
        self.check_open()?;
        self.runtime.publish(data)
    }

    /// Forward to [`Runtime::execute`].
    pub fn execute(&mut self, actions: &Node<'_>) -> Result<(), RuntimeError> {
        self.check_open()?;
        self.runtime.execute(actions)
    }

    /// Forward to [`Runtime::poll`].
    pub fn poll(
        &mut self,
        provider: &mut dyn DataProvider,
        blocking: bool,
    ) -> Result<Control, RuntimeError> {
        self.check_open()?;
        self.runtime.poll(provider, blocking)
    }

    /// Close the session. Later calls are no-ops.
    ///
    /// The session counts as closed even if the runtime reports an error.
    pub fn close(&mut self) -> Result<(), RuntimeError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let result = self.runtime.close();
        info!(runtime = self.runtime.name(), ok = result.is_ok(), "session closed");
        result
    }

    fn check_open(&self) -> Result<(), RuntimeError> {
        if self.open {
            Ok(())
        } else {
            Err(RuntimeError::SessionClosed)
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(runtime = self.runtime.name(), error = %e, "close failed during drop");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("runtime", &self.runtime.name())
            .field("open", &self.open)
            .finish()
    }
}
