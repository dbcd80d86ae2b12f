use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::AgentState;
use super::Instance;
use super::Reporter;
use crate::metrics::PROCESS_TRANSITIONS;
use crate::metrics::PROTOCOL_REJECTIONS;
use crate::metrics::REPORTS_SENT;
use crate::protocol::parse_identity;
use crate::protocol::Command;
use crate::protocol::CommandRequest;
use crate::protocol::Report;
use crate::utils::net::reserve_ports;
use crate::AgentConfig;
use crate::Error;
use crate::LaunchSpec;
use crate::NodeAddress;
use crate::NodeId;
use crate::PeerSet;
use crate::ProcessLauncher;
use crate::ProtocolError;
use crate::QuorumProcess;
use crate::ReadinessPoller;
use crate::Result;
use crate::WorkDir;

/// Drives one consensus member through the configuration protocol.
///
/// All transitions take `&mut self`; callers serialize requests.
pub struct NodeAgent {
    config: Arc<AgentConfig>,
    launcher: Arc<dyn ProcessLauncher>,
    reporter: Option<Arc<dyn Reporter>>,
    poller: ReadinessPoller,

    state: AgentState,
    node_id: Option<NodeId>,
    address: Option<NodeAddress>,
    /// Peer set of the current cluster generation, replaced on every start
    peers: Option<PeerSet>,
    work_dir: WorkDir,
    /// Present exactly while `Running`
    process: Option<Box<dyn QuorumProcess>>,
}

impl std::fmt::Debug for NodeAgent {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NodeAgent")
            .field("state", &self.state)
            .field("node_id", &self.node_id)
            .field("address", &self.address)
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

impl NodeAgent {
    /// Creates the private working directory and returns an unconfigured agent.
    pub fn new(
        config: Arc<AgentConfig>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Result<Self> {
        let work_dir = WorkDir::create(&config.workdir).map_err(|e| {
            error!("working directory could not be created: {:?}", e);
            e
        })?;
        let poller = ReadinessPoller::from_config(&config.readiness);

        Ok(Self {
            config,
            launcher,
            reporter: None,
            poller,
            state: AgentState::Unconfigured,
            node_id: None,
            address: None,
            peers: None,
            work_dir,
            process: None,
        })
    }

    pub fn with_reporter(
        mut self,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }

    pub fn address(&self) -> Option<&NodeAddress> {
        self.address.as_ref()
    }

    pub fn peers(&self) -> Option<&PeerSet> {
        self.peers.as_ref()
    }

    pub fn work_dir(&self) -> &WorkDir {
        &self.work_dir
    }

    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// Reserves the client and peer ports and reports the address pair.
    ///
    /// Valid once, while `Unconfigured`. On port reservation failure the agent
    /// stays `Unconfigured` and nothing is reported.
    pub async fn assign_identity(
        &mut self,
        node_id: NodeId,
    ) -> Result<NodeAddress> {
        self.ensure_state("assign_identity", &[AgentState::Unconfigured])?;

        let host = &self.config.network.advertise_host;
        let mut ports = reserve_ports(host, 2)
            .map_err(|e| {
                error!(node_id, "address reservation failed: {:?}", e);
                e
            })?
            .into_iter();
        let (Some(client), Some(peer)) = (ports.next(), ports.next()) else {
            return Err(Error::Fatal(format!("expected two ports reserved on {host}")));
        };

        let address = NodeAddress { client, peer };
        self.node_id = Some(node_id);
        self.address = Some(address.clone());
        self.state = AgentState::Idle;
        info!(node_id, %address, "identity assigned");

        self.report(Report::Address(address.clone())).await?;
        Ok(address)
    }

    /// Handles `"<peer list> <start|stop>"`. Valid while `Idle` or `Running`.
    pub async fn apply_command(
        &mut self,
        params: &str,
    ) -> Result<()> {
        self.ensure_state("apply_command", &[AgentState::Idle, AgentState::Running])?;

        let request = CommandRequest::parse(params).map_err(|e| self.rejected("malformed", e))?;
        debug!(node_id = ?self.node_id, ?request, "applying command");

        match request.command {
            Command::Start => self.start(&request.peer_spec).await,
            Command::Stop => self.stop().await,
        }
    }

    async fn start(
        &mut self,
        peer_spec: &str,
    ) -> Result<()> {
        let (node_id, client_port) = self.identity()?;
        if self.process.is_some() {
            return Err(self.rejected(
                "already_running",
                ProtocolError::AlreadyRunning { node_id }.into(),
            ));
        }

        let peers = PeerSet::parse(peer_spec).map_err(|e| self.rejected("peer_spec", e))?;

        let spec = LaunchSpec {
            server_id: node_id,
            peers: peers.clone(),
            data_dir: self.work_dir.path().to_path_buf(),
            log_dir: self.work_dir.path().to_path_buf(),
            client_port,
            timing: self.config.quorum,
        };
        let process = self.launcher.launch(spec).await.map_err(|e| {
            error!(node_id, "consensus process launch failed: {:?}", e);
            e
        })?;

        self.peers = Some(peers);
        self.process = Some(process);
        self.state = AgentState::Running;
        PROCESS_TRANSITIONS.with_label_values(&["started"]).inc();
        info!(node_id, peers = %peer_spec, "consensus process started");

        let target = self.probe_target(client_port);
        if !self.poller.wait_until_reachable(&target).await.is_observed() {
            warn!(node_id, %target, "consensus process not reachable yet, reporting started anyway");
        }

        self.report(Report::Started).await
    }

    async fn stop(&mut self) -> Result<()> {
        let (node_id, client_port) = self.identity()?;

        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.shutdown().await {
                error!(node_id, "consensus process shutdown failed: {:?}", e);
            }
            self.state = AgentState::Idle;
            PROCESS_TRANSITIONS.with_label_values(&["stopped"]).inc();
            info!(node_id, "consensus process stopped");
        } else {
            debug!(node_id, "stop requested while idle");
        }

        let target = self.probe_target(client_port);
        if !self.poller.wait_until_unreachable(&target).await.is_observed() {
            warn!(node_id, %target, "consensus process still reachable, reporting stopped anyway");
        }

        self.report(Report::Stopped).await
    }

    /// Stops a live process and deletes the working directory.
    ///
    /// A second call after success is a no-op. If deletion fails the agent is
    /// left undestroyed so the call can be retried.
    pub async fn teardown(&mut self) -> Result<()> {
        if self.state == AgentState::Destroyed {
            return Ok(());
        }

        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.shutdown().await {
                error!(node_id = ?self.node_id, "consensus process shutdown failed: {:?}", e);
            }
            PROCESS_TRANSITIONS.with_label_values(&["stopped"]).inc();
            self.state = AgentState::Idle;
        }

        self.work_dir.destroy().await.map_err(|e| {
            error!(path = ?self.work_dir.path(), "working directory removal failed: {:?}", e);
            e
        })?;

        self.state = AgentState::Destroyed;
        info!(node_id = ?self.node_id, "agent torn down");
        Ok(())
    }

    fn ensure_state(
        &self,
        operation: &'static str,
        allowed: &[AgentState],
    ) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(self.rejected(
            "invalid_state",
            ProtocolError::InvalidState {
                operation,
                state: self.state.as_str(),
            }
            .into(),
        ))
    }

    fn identity(&self) -> Result<(NodeId, u16)> {
        match (self.node_id, &self.address) {
            (Some(node_id), Some(address)) => Ok((node_id, address.client.port)),
            _ => Err(ProtocolError::InvalidState {
                operation: "identity",
                state: self.state.as_str(),
            }
            .into()),
        }
    }

    fn rejected(
        &self,
        reason: &'static str,
        err: Error,
    ) -> Error {
        PROTOCOL_REJECTIONS.with_label_values(&[reason]).inc();
        warn!(node_id = ?self.node_id, state = %self.state, "request rejected: {}", err);
        err
    }

    fn probe_target(
        &self,
        client_port: u16,
    ) -> String {
        format!("{}:{}", self.config.network.probe_host, client_port)
    }

    async fn report(
        &self,
        report: Report,
    ) -> Result<()> {
        let Some(reporter) = &self.reporter else {
            debug!(%report, "no reporter attached, dropping report");
            return Ok(());
        };

        reporter.report(&report.to_string()).await?;
        REPORTS_SENT.with_label_values(&[report.kind()]).inc();
        debug!(node_id = ?self.node_id, %report, "reported");
        Ok(())
    }
}

#[async_trait]
impl Instance for NodeAgent {
    fn set_reporter(
        &mut self,
        reporter: Arc<dyn Reporter>,
    ) {
        self.reporter = Some(reporter);
    }

    async fn configure(
        &mut self,
        params: &str,
    ) {
        debug!(node_id = ?self.node_id, %params, "configure request");

        let result = if self.state == AgentState::Unconfigured {
            match parse_identity(params) {
                Ok(node_id) => self.assign_identity(node_id).await.map(|_| ()),
                Err(e) => Err(self.rejected("identity", e)),
            }
        } else {
            self.apply_command(params).await
        };

        if let Err(e) = result {
            debug!(node_id = ?self.node_id, "configure request produced no report: {}", e);
        }
    }

    async fn start(&mut self) {
        debug!(node_id = ?self.node_id, "instance started, waiting for configuration");
    }

    async fn stop(&mut self) {
        if let Err(e) = self.teardown().await {
            error!(node_id = ?self.node_id, "teardown failed: {:?}", e);
        }
    }
}
