//! Orchestrator seam and the call sequences the test harness uses to drive
//! one consensus member through create, start and stop.
//!
//! [`InstanceManager`] is the central instance allocation and status
//! tracking service. [`LocalInstanceManager`] implements it in process.

mod local;
pub use local::*;

#[cfg(test)]
mod orchestrator_test;

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::info;

use crate::protocol::STARTED;
use crate::protocol::STOPPED;
use crate::OrchestrationConfig;
use crate::OrchestratorError;
use crate::Result;

/// Instance kind that runs a [`NodeAgent`](crate::NodeAgent)
pub const QUORUM_PEER_KIND: &str = "quorum-peer";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InstanceManager: Send + Sync {
    /// Creates a named instance of `kind` and delivers `params` as its first
    /// configuration request.
    async fn assign_instance(
        &self,
        name: &str,
        kind: &str,
        params: &str,
        weight: u32,
    ) -> Result<()>;

    /// Forgets the last status reported by `name`.
    async fn reset_status(
        &self,
        name: &str,
    ) -> Result<()>;

    async fn reconfigure_instance(
        &self,
        name: &str,
        params: &str,
    ) -> Result<()>;

    /// Waits up to `timeout` for `name` to report a status.
    async fn get_status(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<String>;
}

/// Assigns `server<index>` and returns the address pair it reports.
pub async fn create_server(
    im: &dyn InstanceManager,
    config: &OrchestrationConfig,
    index: u32,
) -> Result<String> {
    let name = config.instance_name(index);
    im.assign_instance(&name, QUORUM_PEER_KIND, &index.to_string(), config.assign_weight)
        .await?;
    let address = im.get_status(&name, config.create_timeout()).await?;
    info!(%name, %address, "server created");
    Ok(address)
}

/// Starts `server<index>` with the given peer list and waits for `started`.
pub async fn start_instance(
    im: &dyn InstanceManager,
    config: &OrchestrationConfig,
    peer_spec: &str,
    index: u32,
) -> Result<()> {
    let name = config.instance_name(index);
    im.reset_status(&name).await?;
    im.reconfigure_instance(&name, &format!("{peer_spec} start")).await?;
    let status = im.get_status(&name, config.start_timeout()).await?;
    expect_status(name, STARTED, status)
}

/// Stops `server<index>` and waits for `stopped`.
pub async fn stop_instance(
    im: &dyn InstanceManager,
    config: &OrchestrationConfig,
    index: u32,
) -> Result<()> {
    let name = config.instance_name(index);
    im.reset_status(&name).await?;
    im.reconfigure_instance(&name, &format!("{index} stop")).await?;
    let status = im.get_status(&name, config.stop_timeout()).await?;
    expect_status(name, STOPPED, status)
}

fn expect_status(
    name: String,
    expected: &'static str,
    actual: String,
) -> Result<()> {
    if actual == expected {
        info!(%name, status = expected, "instance reported");
        return Ok(());
    }
    Err(OrchestratorError::UnexpectedStatus {
        name,
        expected,
        actual,
    }
    .into())
}
