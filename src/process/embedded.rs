use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;

use super::LaunchSpec;
use super::ProcessLauncher;
use super::QuorumProcess;
use crate::NodeId;
use crate::Result;

/// Runs a consensus server inside the current tokio runtime.
///
/// `server` is called once per launch with the spec and a shutdown receiver;
/// it must return when the receiver changes. Shutdown sends on the channel
/// and joins the task.
pub struct EmbeddedLauncher<F> {
    server: Arc<F>,
}

impl<F> EmbeddedLauncher<F> {
    pub fn new(server: F) -> Self {
        Self {
            server: Arc::new(server),
        }
    }
}

#[async_trait]
impl<F, Fut> ProcessLauncher for EmbeddedLauncher<F>
where
    F: Fn(LaunchSpec, watch::Receiver<()>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn launch(
        &self,
        spec: LaunchSpec,
    ) -> Result<Box<dyn QuorumProcess>> {
        let server_id = spec.server_id;
        let (graceful_tx, graceful_rx) = watch::channel(());

        let server = (self.server)(spec, graceful_rx);
        let handle = tokio::spawn(async move {
            let result = server.await;
            if let Err(ref e) = result {
                error!(server_id, "embedded consensus server stopped: {:?}", e);
            }
            result
        });

        debug!(server_id, "embedded consensus server spawned");
        Ok(Box::new(EmbeddedProcess {
            server_id,
            graceful_tx,
            handle: Some(handle),
        }))
    }
}

pub struct EmbeddedProcess {
    server_id: NodeId,
    graceful_tx: watch::Sender<()>,
    handle: Option<JoinHandle<Result<()>>>,
}

#[async_trait]
impl QuorumProcess for EmbeddedProcess {
    fn server_id(&self) -> NodeId {
        self.server_id
    }

    async fn shutdown(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        if self.graceful_tx.send(()).is_err() {
            debug!(server_id = self.server_id, "embedded server already dropped its receiver");
        }

        // A panicked or cancelled server surfaces as TaskFailed
        handle.await?
    }
}
