use std::path::PathBuf;

use crate::{ControlError, IdentityError, ProcessError, ServerState};

/// Errors returned by [`V2RayServer`](crate::V2RayServer).
#[derive(Debug, thiserror::Error)]
pub enum V2RayError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A peer operation was attempted outside the running state.
    #[error("cannot {op}: server is {state}, not running")]
    NotRunning { op: &'static str, state: ServerState },

    /// A lifecycle transition was attempted from the wrong state.
    #[error("cannot {op} while server is {state}")]
    InvalidState { op: &'static str, state: ServerState },

    #[error("engine config file not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
