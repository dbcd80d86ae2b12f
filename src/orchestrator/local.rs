use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::InstanceManager;
use super::QUORUM_PEER_KIND;
use crate::AgentConfig;
use crate::Instance;
use crate::NodeAgent;
use crate::OrchestratorError;
use crate::ProcessLauncher;
use crate::Reporter;
use crate::Result;

/// Builds a fresh instance for the given instance name
pub type InstanceFactory = Box<dyn Fn(&str) -> Result<Box<dyn Instance>> + Send + Sync>;

enum InstanceRequest {
    Configure(String),
    Stop(oneshot::Sender<()>),
}

#[derive(Clone)]
struct Slot {
    requests: mpsc::UnboundedSender<InstanceRequest>,
    status: Arc<watch::Sender<Option<String>>>,
}

/// In-process [`InstanceManager`].
///
/// Each instance is owned by its own task which applies requests in arrival
/// order. Status is the last value the instance reported.
pub struct LocalInstanceManager {
    factories: RwLock<HashMap<String, InstanceFactory>>,
    instances: DashMap<String, Slot>,
    /// Serializes the capacity check with the insert that fills the slot
    admission: Mutex<()>,
    capacity: usize,
}

impl LocalInstanceManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
            instances: DashMap::new(),
            admission: Mutex::new(()),
            capacity,
        }
    }

    pub fn register_kind(
        &self,
        kind: impl Into<String>,
        factory: InstanceFactory,
    ) {
        self.factories.write().insert(kind.into(), factory);
    }

    /// Registers [`QUORUM_PEER_KIND`] as a [`NodeAgent`] built from `config`
    /// and `launcher`.
    pub fn register_node_agents(
        &self,
        config: Arc<AgentConfig>,
        launcher: Arc<dyn ProcessLauncher>,
    ) {
        self.register_kind(
            QUORUM_PEER_KIND,
            Box::new(move |_name: &str| -> Result<Box<dyn Instance>> {
                let agent = NodeAgent::new(config.clone(), launcher.clone())?;
                Ok(Box::new(agent) as Box<dyn Instance>)
            }),
        );
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Stops `name` and forgets it. Waits until the instance has finished
    /// its stop.
    pub async fn remove_instance(
        &self,
        name: &str,
    ) -> Result<()> {
        let (_, slot) = self
            .instances
            .remove(name)
            .ok_or_else(|| OrchestratorError::NoAssignment(name.to_string()))?;

        let (done_tx, done_rx) = oneshot::channel();
        if slot.requests.send(InstanceRequest::Stop(done_tx)).is_err() {
            warn!(%name, "instance task already gone");
            return Ok(());
        }
        if done_rx.await.is_err() {
            warn!(%name, "instance task ended before acknowledging stop");
        }
        info!(%name, "instance removed");
        Ok(())
    }

    pub async fn shutdown_all(&self) -> Result<()> {
        let names: Vec<String> = self.instances.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.remove_instance(&name).await?;
        }
        Ok(())
    }

    fn slot(
        &self,
        name: &str,
    ) -> Result<Slot> {
        self.instances
            .get(name)
            .map(|slot| slot.value().clone())
            .ok_or_else(|| OrchestratorError::NoAssignment(name.to_string()).into())
    }

    /// Inserts `slot` under `name` if the name is free and capacity remains.
    fn admit(
        &self,
        name: &str,
        slot: Slot,
    ) -> Result<()> {
        let _admission = self.admission.lock();
        if self.instances.len() >= self.capacity {
            return Err(OrchestratorError::NoAvailableContainers(name.to_string()).into());
        }
        match self.instances.entry(name.to_string()) {
            Entry::Occupied(_) => Err(OrchestratorError::DuplicateName(name.to_string()).into()),
            Entry::Vacant(entry) => {
                entry.insert(slot);
                Ok(())
            }
        }
    }

    fn build(
        &self,
        name: &str,
        kind: &str,
    ) -> Result<Box<dyn Instance>> {
        let factories = self.factories.read();
        let factory = factories
            .get(kind)
            .ok_or_else(|| OrchestratorError::NoAvailableContainers(format!("{name} of kind {kind}")))?;
        factory(name)
    }
}

#[async_trait]
impl InstanceManager for LocalInstanceManager {
    async fn assign_instance(
        &self,
        name: &str,
        kind: &str,
        params: &str,
        weight: u32,
    ) -> Result<()> {
        if self.instances.contains_key(name) {
            return Err(OrchestratorError::DuplicateName(name.to_string()).into());
        }
        if self.instances.len() >= self.capacity {
            return Err(OrchestratorError::NoAvailableContainers(name.to_string()).into());
        }

        let mut instance = self.build(name, kind)?;
        let (status_tx, _) = watch::channel(None);
        let status = Arc::new(status_tx);
        instance.set_reporter(Arc::new(StatusReporter {
            status: status.clone(),
        }));

        let (requests, requests_rx) = mpsc::unbounded_channel();
        let slot = Slot { requests, status };
        self.admit(name, slot.clone())?;

        tokio::spawn(run_instance(name.to_string(), instance, requests_rx));
        debug!(%name, %kind, weight, "instance assigned");

        // The receiver lives in the spawned task until stop
        let _ = slot.requests.send(InstanceRequest::Configure(params.to_string()));
        Ok(())
    }

    async fn reset_status(
        &self,
        name: &str,
    ) -> Result<()> {
        self.slot(name)?.status.send_replace(None);
        Ok(())
    }

    async fn reconfigure_instance(
        &self,
        name: &str,
        params: &str,
    ) -> Result<()> {
        let slot = self.slot(name)?;
        slot.requests
            .send(InstanceRequest::Configure(params.to_string()))
            .map_err(|_| OrchestratorError::NoAssignment(name.to_string()))?;
        debug!(%name, %params, "reconfigure queued");
        Ok(())
    }

    async fn get_status(
        &self,
        name: &str,
        duration: Duration,
    ) -> Result<String> {
        let mut status_rx = self.slot(name)?.status.subscribe();
        let waited = timeout(duration, status_rx.wait_for(Option::is_some))
            .await
            .map(|changed| changed.map(|status| (*status).clone().unwrap_or_default()));
        match waited {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(_)) => Err(OrchestratorError::NoAssignment(name.to_string()).into()),
            Err(_) => Err(OrchestratorError::StatusTimeout {
                name: name.to_string(),
                duration,
            }
            .into()),
        }
    }
}

async fn run_instance(
    name: String,
    mut instance: Box<dyn Instance>,
    mut requests: mpsc::UnboundedReceiver<InstanceRequest>,
) {
    instance.start().await;

    while let Some(request) = requests.recv().await {
        match request {
            InstanceRequest::Configure(params) => instance.configure(&params).await,
            InstanceRequest::Stop(done) => {
                instance.stop().await;
                let _ = done.send(());
                return;
            }
        }
    }

    debug!(%name, "manager dropped, stopping instance");
    instance.stop().await;
}

struct StatusReporter {
    status: Arc<watch::Sender<Option<String>>>,
}

#[async_trait]
impl Reporter for StatusReporter {
    async fn report(
        &self,
        status: &str,
    ) -> Result<()> {
        self.status.send_replace(Some(status.to_string()));
        Ok(())
    }
}
