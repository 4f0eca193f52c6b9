//! Sleep prevention while a run is in progress.

use std::io;
use std::process::{Child, Command, Stdio};

use parking_lot::Mutex;
use thiserror::Error;

/// Sleep prevention could not be acquired. Never fatal to a run.
#[derive(Error, Debug)]
pub enum PowerError {
    #[error("Sleep prevention is not supported on this platform")]
    Unsupported,

    #[error("Failed to start sleep inhibitor: {0}")]
    SpawnFailed(#[from] io::Error),
}

/// An OS facility that keeps the machine awake.
pub trait SleepInhibitor: Send {
    fn acquire(&mut self) -> Result<(), PowerError>;
    fn release(&mut self);
}

/// Holds a `systemd-inhibit` (Linux) or `caffeinate` (macOS) child
/// process for as long as the assertion is held.
#[derive(Debug)]
pub struct SystemInhibitor {
    reason: String,
    child: Option<Child>,
}

impl SystemInhibitor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            child: None,
        }
    }

    fn command(&self) -> Option<Command> {
        if cfg!(target_os = "linux") {
            let mut cmd = Command::new("systemd-inhibit");
            cmd.arg("--what=idle:sleep")
                .arg("--who=media-tag-queue")
                .arg(format!("--why={}", self.reason))
                .arg("--mode=block")
                .arg("sleep")
                .arg("infinity");
            Some(cmd)
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("caffeinate");
            cmd.arg("-i");
            Some(cmd)
        } else {
            None
        }
    }
}

impl SleepInhibitor for SystemInhibitor {
    fn acquire(&mut self) -> Result<(), PowerError> {
        let mut cmd = self.command().ok_or(PowerError::Unsupported)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        tracing::debug!("Running sleep inhibitor: {:?}", cmd);
        self.child = Some(cmd.spawn()?);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::warn!("Failed to stop sleep inhibitor: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Drop for SystemInhibitor {
    fn drop(&mut self) {
        self.release();
    }
}

/// Inhibitor that does nothing.
#[derive(Debug, Default)]
pub struct NoopInhibitor;

impl SleepInhibitor for NoopInhibitor {
    fn acquire(&mut self) -> Result<(), PowerError> {
        Ok(())
    }

    fn release(&mut self) {}
}

/// Process-wide sleep-prevention assertion.
///
/// `acquire` while held and `release` while not held are no-ops, so the
/// underlying inhibitor sees exactly one acquire/release pair per run.
pub struct PowerAssertion {
    inner: Mutex<AssertionState>,
}

struct AssertionState {
    inhibitor: Box<dyn SleepInhibitor>,
    held: bool,
}

impl PowerAssertion {
    pub fn new(inhibitor: Box<dyn SleepInhibitor>) -> Self {
        Self {
            inner: Mutex::new(AssertionState {
                inhibitor,
                held: false,
            }),
        }
    }

    /// Take the assertion. Failure is logged and processing goes on
    /// without sleep protection.
    pub fn acquire(&self) {
        let mut state = self.inner.lock();
        if state.held {
            return;
        }
        match state.inhibitor.acquire() {
            Ok(()) => {
                state.held = true;
                tracing::debug!("Sleep prevention acquired");
            }
            Err(e) => tracing::warn!("Sleep prevention unavailable: {}", e),
        }
    }

    pub fn release(&self) {
        let mut state = self.inner.lock();
        if !state.held {
            return;
        }
        state.inhibitor.release();
        state.held = false;
        tracing::debug!("Sleep prevention released");
    }

    pub fn is_held(&self) -> bool {
        self.inner.lock().held
    }
}

impl std::fmt::Debug for PowerAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerAssertion")
            .field("held", &self.is_held())
            .finish()
    }
}
