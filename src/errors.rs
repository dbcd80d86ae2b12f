//! Agent Error Hierarchy
//!
//! Errors are grouped by the layer that raises them: local resources
//! (ports, directories, processes), the text configuration protocol, and the
//! orchestration service driving the agents.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Local resource failures (sockets, filesystem, child processes)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Agent configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed or out-of-order configuration requests
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Failures surfaced by the instance manager
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Ephemeral port could not be bound on the advertised host
    #[error("Failed to reserve a port on {host}: {source}")]
    PortReservation {
        host: String,
        source: std::io::Error,
    },

    /// Working directory creation, write or removal failure
    #[error("I/O error at path {path}: {source}")]
    Path {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Consensus process failed to launch: {0}")]
    ProcessLaunch(String),

    #[error("Consensus process failed to shut down: {0}")]
    ProcessShutdown(String),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    /// Report could not be delivered upstream
    #[error("Report delivery failed: {0}")]
    Report(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Expected `host:port,... start|stop`, found {0:?}")]
    MalformedCommand(String),

    #[error("Invalid node identity {0:?}")]
    InvalidIdentity(String),

    #[error("Invalid peer list {0:?}")]
    InvalidPeerSpec(String),

    /// Start requested while a process handle is live
    #[error("Peer {node_id} already started")]
    AlreadyRunning { node_id: u32 },

    #[error("{operation} is not valid while agent is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("No status reported by {name} within {duration:?}")]
    StatusTimeout { name: String, duration: Duration },

    #[error("No instance assigned under name {0}")]
    NoAssignment(String),

    #[error("Instance name {0} is already assigned")]
    DuplicateName(String),

    #[error("No container available for {0}")]
    NoAvailableContainers(String),

    #[error("{name} reported {actual:?}, expected {expected:?}")]
    UnexpectedStatus {
        name: String,
        expected: &'static str,
        actual: String,
    },
}

// ============== Conversion Implementations ============== //

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::System(SystemError::Io(e))
    }
}

impl From<JoinError> for Error {
    fn from(e: JoinError) -> Self {
        Error::System(SystemError::TaskFailed(e))
    }
}
