use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Child;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::LaunchSpec;
use super::ProcessLauncher;
use super::QuorumProcess;
use crate::utils::file_io::open_file_for_append;
use crate::Error;
use crate::NetworkConfig;
use crate::NodeId;
use crate::ProcessConfig;
use crate::Result;
use crate::SystemError;

/// Receives the child's stdout and stderr, under the launch log directory
pub const CHILD_OUTPUT_FILE: &str = "quorum.out";

/// Launches an external consensus server binary.
///
/// Each launch renders a member config into the data directory and runs
/// `<program> <args...> --config <file>` with the data directory as cwd.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: PathBuf,
    args: Vec<String>,
    config_file_name: String,
    listen_host: String,
    shutdown_grace: Duration,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            config_file_name: ProcessConfig::default().config_file_name,
            listen_host: NetworkConfig::default().advertise_host,
            shutdown_grace: Duration::from_millis(ProcessConfig::default().shutdown_grace_ms),
        }
    }

    pub fn from_config(
        process: &ProcessConfig,
        network: &NetworkConfig,
    ) -> Result<Self> {
        if process.program.trim().is_empty() {
            return Err(Error::Config(config::ConfigError::Message(
                "process.program must name the consensus server binary".into(),
            )));
        }
        Ok(Self {
            program: PathBuf::from(&process.program),
            args: process.args.clone(),
            config_file_name: process.config_file_name.clone(),
            listen_host: network.advertise_host.clone(),
            shutdown_grace: Duration::from_millis(process.shutdown_grace_ms),
        })
    }

    pub fn args(
        mut self,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// How long [`QuorumProcess::shutdown`] waits after SIGTERM before killing
    pub fn shutdown_grace(
        mut self,
        grace: Duration,
    ) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub(crate) fn render_config(
        &self,
        spec: &LaunchSpec,
    ) -> Result<String> {
        let member = MemberConfig {
            node_id: spec.server_id,
            listen_address: format!("{}:{}", self.listen_host, spec.client_port),
            db_root_dir: &spec.data_dir,
            log_dir: &spec.log_dir,
            tick_time_ms: spec.timing.tick_time_ms,
            init_limit: spec.timing.init_limit,
            sync_limit: spec.timing.sync_limit,
            initial_cluster: spec
                .peers
                .iter()
                .map(|(id, endpoint)| ClusterMember {
                    id,
                    address: endpoint.to_string(),
                })
                .collect(),
        };
        toml::to_string(&member)
            .map_err(|e| SystemError::ProcessLaunch(format!("render member config: {e}")).into())
    }
}

/// Member config file read by the consensus server
#[derive(Serialize)]
struct MemberConfig<'a> {
    node_id: NodeId,
    listen_address: String,
    db_root_dir: &'a Path,
    log_dir: &'a Path,
    tick_time_ms: u64,
    init_limit: u32,
    sync_limit: u32,
    initial_cluster: Vec<ClusterMember>,
}

#[derive(Serialize)]
struct ClusterMember {
    id: NodeId,
    address: String,
}

#[async_trait]
impl ProcessLauncher for CommandLauncher {
    async fn launch(
        &self,
        spec: LaunchSpec,
    ) -> Result<Box<dyn QuorumProcess>> {
        let config_path = spec.data_dir.join(&self.config_file_name);
        tokio::fs::write(&config_path, self.render_config(&spec)?)
            .await
            .map_err(|source| SystemError::Path {
                path: config_path.clone(),
                source,
            })?;

        let output_path = spec.log_dir.join(CHILD_OUTPUT_FILE);
        let stdout = open_file_for_append(output_path.clone())?;
        let stderr = stdout.try_clone().map_err(|source| SystemError::Path {
            path: output_path.clone(),
            source,
        })?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("--config")
            .arg(&config_path)
            .current_dir(&spec.data_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SystemError::ProcessLaunch(format!("{}: {}", self.program.display(), e))
            })?;

        info!(
            server_id = spec.server_id,
            pid = ?child.id(),
            program = ?self.program,
            output = ?output_path,
            "spawned consensus process"
        );
        Ok(Box::new(ChildProcess {
            server_id: spec.server_id,
            child,
            grace: self.shutdown_grace,
        }))
    }
}

pub struct ChildProcess {
    server_id: NodeId,
    child: Child,
    grace: Duration,
}

impl ChildProcess {
    /// Asks the child to exit. Failures are logged and left to the kill
    /// that follows an expired grace period.
    #[cfg(unix)]
    async fn terminate(&self) {
        let Some(pid) = self.child.id() else {
            return;
        };
        match Command::new("kill").arg("-TERM").arg(pid.to_string()).status().await {
            Ok(status) if status.success() => {
                debug!(server_id = self.server_id, pid, "sent SIGTERM");
            }
            Ok(status) => {
                warn!(server_id = self.server_id, pid, %status, "kill -TERM failed");
            }
            Err(e) => {
                warn!(server_id = self.server_id, pid, error = %e, "could not run kill -TERM");
            }
        }
    }

    #[cfg(not(unix))]
    async fn terminate(&self) {}
}

#[async_trait]
impl QuorumProcess for ChildProcess {
    fn server_id(&self) -> NodeId {
        self.server_id
    }

    /// SIGTERM first, then a hard kill once the grace period runs out.
    async fn shutdown(&mut self) -> Result<()> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                warn!(server_id = self.server_id, %status, "consensus process had already exited");
                return Ok(());
            }
            Ok(None) => {}
            Err(e) => return Err(SystemError::ProcessShutdown(e.to_string()).into()),
        }

        self.terminate().await;
        match timeout(self.grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(server_id = self.server_id, %status, "consensus process exited");
                return Ok(());
            }
            Ok(Err(e)) => return Err(SystemError::ProcessShutdown(e.to_string()).into()),
            Err(_) => {
                warn!(
                    server_id = self.server_id,
                    grace = ?self.grace,
                    "consensus process ignored SIGTERM, killing"
                );
            }
        }

        self.child
            .kill()
            .await
            .map_err(|e| SystemError::ProcessShutdown(e.to_string()))?;
        debug!(server_id = self.server_id, "consensus process reaped");
        Ok(())
    }
}
