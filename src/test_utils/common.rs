use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::debug;

use crate::AgentConfig;
use crate::EmbeddedLauncher;
use crate::LaunchSpec;
use crate::ProcessLauncher;
use crate::ReadinessConfig;
use crate::Result;
use crate::WorkDirConfig;

pub(crate) const TEST_POLL_INTERVAL_MS: u64 = 20;
pub(crate) const TEST_POLL_ATTEMPTS: usize = 5;

/// Agent config rooted at `root` with a fast readiness poll.
pub(crate) fn test_config(root: &Path) -> AgentConfig {
    AgentConfig {
        readiness: ReadinessConfig {
            attempts: TEST_POLL_ATTEMPTS,
            interval_ms: TEST_POLL_INTERVAL_MS,
        },
        workdir: WorkDirConfig {
            root: root.to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub(crate) fn poll_budget() -> Duration {
    Duration::from_millis(TEST_POLL_INTERVAL_MS * TEST_POLL_ATTEMPTS as u64)
}

/// Stands in for a consensus member: accepts on the client port until told
/// to shut down.
pub(crate) async fn loopback_server(
    spec: LaunchSpec,
    mut graceful_rx: watch::Receiver<()>,
) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", spec.client_port)).await?;
    debug!(server_id = spec.server_id, port = spec.client_port, "loopback server listening");
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

pub(crate) fn loopback_launcher() -> Arc<dyn ProcessLauncher> {
    Arc::new(EmbeddedLauncher::new(loopback_server))
}
