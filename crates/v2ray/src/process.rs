//! Supervision of the engine process.

use std::mem;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use auto_impl::auto_impl;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("process not initialized")]
    NotStarted,

    #[error("process already started")]
    AlreadyStarted,

    #[error("process already stopped")]
    Stopped,

    #[error("failed to spawn {}: {source}", .exec.display())]
    Spawn {
        exec: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to kill process: {0}")]
    Kill(#[source] std::io::Error),
}

/// Lifecycle of a supervised process. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProcessStatus {
    NotStarted,
    Running,
    Stopped,
}

/// Start/stop control over an external engine process.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait EngineProcess: Send + Sync {
    /// Spawn the process.
    fn start(&self) -> Result<(), ProcessError>;

    /// Terminate the process and wait for it to exit.
    async fn stop(&self) -> Result<(), ProcessError>;

    fn status(&self) -> ProcessStatus;
}

#[derive(Debug)]
enum State {
    NotStarted,
    Running(Child),
    Stopped,
}

/// Runs `<exec> run --config <path>` with inherited stdout and stderr.
///
/// No restart or health checking is done; callers poll [`is_alive`](Self::is_alive)
/// if they care.
#[derive(Debug)]
pub struct ProcessSupervisor {
    exec: PathBuf,
    config_file: PathBuf,
    state: Mutex<State>,
}

impl ProcessSupervisor {
    pub fn new(exec: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        Self {
            exec: exec.into(),
            config_file: config_file.into(),
            state: Mutex::new(State::NotStarted),
        }
    }

    pub fn exec(&self) -> &Path {
        &self.exec
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// OS process id while running.
    pub fn pid(&self) -> Option<u32> {
        match &*self.state.lock() {
            State::Running(child) => child.id(),
            _ => None,
        }
    }

    /// Whether the process is running and has not exited on its own.
    pub fn is_alive(&self) -> bool {
        match &mut *self.state.lock() {
            State::Running(child) => matches!(child.try_wait(), Ok(None)),
            _ => false,
        }
    }
}

#[async_trait]
impl EngineProcess for ProcessSupervisor {
    fn start(&self) -> Result<(), ProcessError> {
        let mut state = self.state.lock();
        match &*state {
            State::NotStarted => {}
            State::Running(_) => return Err(ProcessError::AlreadyStarted),
            State::Stopped => return Err(ProcessError::Stopped),
        }

        let child = Command::new(&self.exec)
            .arg("run")
            .arg("--config")
            .arg(&self.config_file)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                exec: self.exec.clone(),
                source,
            })?;

        info!(
            exec = %self.exec.display(),
            config = %self.config_file.display(),
            pid = ?child.id(),
            "started engine process"
        );
        *state = State::Running(child);
        Ok(())
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        let mut child = {
            let mut state = self.state.lock();
            match mem::replace(&mut *state, State::Stopped) {
                State::Running(child) => child,
                State::NotStarted => {
                    *state = State::NotStarted;
                    return Err(ProcessError::NotStarted);
                }
                State::Stopped => return Err(ProcessError::Stopped),
            }
        };

        // An engine that already died has nothing left to kill.
        if let Ok(Some(status)) = child.try_wait() {
            warn!(%status, "engine process had already exited");
            return Ok(());
        }

        child.kill().await.map_err(ProcessError::Kill)?;
        info!("stopped engine process");
        Ok(())
    }

    fn status(&self) -> ProcessStatus {
        match &*self.state.lock() {
            State::NotStarted => ProcessStatus::NotStarted,
            State::Running(_) => ProcessStatus::Running,
            State::Stopped => ProcessStatus::Stopped,
        }
    }
}
