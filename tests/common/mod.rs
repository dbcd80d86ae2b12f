use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quorum_agent::AgentConfig;
use quorum_agent::EmbeddedLauncher;
use quorum_agent::LaunchSpec;
use quorum_agent::LocalInstanceManager;
use quorum_agent::OrchestrationConfig;
use quorum_agent::ProcessLauncher;
use quorum_agent::ReadinessConfig;
use quorum_agent::Result;
use quorum_agent::WorkDirConfig;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::debug;

pub const POLL_INTERVAL_MS: u64 = 20;

/// Every launch the cluster saw, in launch order
pub type LaunchLog = Arc<Mutex<Vec<LaunchSpec>>>;

pub fn agent_config(root: &Path) -> AgentConfig {
    AgentConfig {
        readiness: ReadinessConfig {
            attempts: 10,
            interval_ms: POLL_INTERVAL_MS,
        },
        workdir: WorkDirConfig {
            root: root.to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Consensus member stand-in: accepts on the client port until shutdown.
async fn loopback_member(
    spec: LaunchSpec,
    mut graceful_rx: watch::Receiver<()>,
) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", spec.client_port)).await?;
    debug!(server_id = spec.server_id, port = spec.client_port, "member listening");
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                drop(accepted?);
            }
            _ = graceful_rx.changed() => {
                return Ok(());
            }
        }
    }
}

pub fn recording_launcher(launches: LaunchLog) -> Arc<dyn ProcessLauncher> {
    Arc::new(EmbeddedLauncher::new(move |spec: LaunchSpec, graceful_rx: watch::Receiver<()>| {
        launches.lock().push(spec.clone());
        loopback_member(spec, graceful_rx)
    }))
}

pub fn cluster_manager(
    root: &Path,
    capacity: usize,
) -> (LocalInstanceManager, OrchestrationConfig, LaunchLog) {
    let launches = LaunchLog::default();
    let manager = LocalInstanceManager::new(capacity);
    manager.register_node_agents(
        Arc::new(agent_config(root)),
        recording_launcher(launches.clone()),
    );
    (manager, OrchestrationConfig::default(), launches)
}

pub async fn is_listening(addr: &str) -> bool {
    matches!(
        tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}
