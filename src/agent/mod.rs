//! Per-member test-control agent.
//!
//! ## Lifecycle
//! ```text
//! new (working dir created)
//!   -> Unconfigured --identity--> Idle <--start/stop--> Running
//!   -> teardown -> Destroyed
//! ```
//! The agent never runs consensus logic itself; it reserves addresses, hands
//! a [`LaunchSpec`](crate::LaunchSpec) to its [`ProcessLauncher`](crate::ProcessLauncher)
//! and reports the outcome upstream through a [`Reporter`].

mod node_agent;
mod reporter;
pub use node_agent::*;
pub use reporter::*;


use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Built, working directory exists, no identity yet
    Unconfigured,
    /// Address pair reserved, no consensus process
    Idle,
    /// A consensus process handle is live
    Running,
    /// Torn down; every further request is rejected
    Destroyed,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Unconfigured => "unconfigured",
            AgentState::Idle => "idle",
            AgentState::Running => "running",
            AgentState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worker-side contract an orchestrator drives.
///
/// A rejected `configure` request produces no report and no error.
#[async_trait]
pub trait Instance: Send {
    fn set_reporter(
        &mut self,
        reporter: Arc<dyn Reporter>,
    );

    async fn configure(
        &mut self,
        params: &str,
    );

    async fn start(&mut self);

    /// Final stop; the instance is unusable afterwards.
    async fn stop(&mut self);
}
