//! Seam between the agent and the consensus process it drives.
//!
//! The agent never runs consensus logic itself. It asks a [`ProcessLauncher`]
//! for a running member and later shuts that member down through the returned
//! [`QuorumProcess`] handle.
//!
//! Two launchers ship with the crate:
//! - [`CommandLauncher`] spawns an external server binary with a rendered
//!   member config
//! - [`EmbeddedLauncher`] runs an async server function as a tokio task

mod command;
mod embedded;
pub use command::*;
pub use embedded::*;


use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::NodeId;
use crate::PeerSet;
use crate::QuorumTimingConfig;
use crate::Result;

/// Everything a consensus member needs to come up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// The agent's own identity, not its position in `peers`
    pub server_id: NodeId,
    pub peers: PeerSet,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Reserved client-facing port the member must listen on
    pub client_port: u16,
    pub timing: QuorumTimingConfig,
}

/// Handle to one live consensus member
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuorumProcess: Send + Sync {
    fn server_id(&self) -> NodeId;

    /// Requests shutdown and waits for the member to go away.
    async fn shutdown(&mut self) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(
        &self,
        spec: LaunchSpec,
    ) -> Result<Box<dyn QuorumProcess>>;
}
