//! Text configuration protocol between the orchestrator and one agent.
//!
//! - first request: decimal identity, e.g. `"0"`; reply is the reserved
//!   [`NodeAddress`]
//! - later requests: `"<host:port,...> <start|stop>"`; reply is `"started"` or
//!   `"stopped"`
//!
//! Malformed requests get no reply at all.


use std::fmt;

use crate::NodeAddress;
use crate::NodeId;
use crate::ProtocolError;
use crate::Result;

pub const STARTED: &str = "started";
pub const STOPPED: &str = "stopped";

const START: &str = "start";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    /// Anything other than the exact word `start` stops the member.
    pub fn parse(word: &str) -> Self {
        if word == START {
            Command::Start
        } else {
            Command::Stop
        }
    }
}

/// A lifecycle request: the peer list of the cluster generation plus the
/// command word. The peer list is left unparsed; only start consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub peer_spec: String,
    pub command: Command,
}

impl CommandRequest {
    /// Splits at the first space.
    pub fn parse(params: &str) -> Result<Self> {
        let (peer_spec, word) = params
            .split_once(' ')
            .ok_or_else(|| ProtocolError::MalformedCommand(params.to_string()))?;
        Ok(Self {
            peer_spec: peer_spec.to_string(),
            command: Command::parse(word),
        })
    }
}

pub fn parse_identity(params: &str) -> Result<NodeId> {
    params
        .parse::<NodeId>()
        .map_err(|_| ProtocolError::InvalidIdentity(params.to_string()).into())
}

/// Replies an agent sends upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Address(NodeAddress),
    Started,
    Stopped,
}

impl Report {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Report::Address(_) => "address",
            Report::Started => STARTED,
            Report::Stopped => STOPPED,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Report::Address(address) => write!(f, "{address}"),
            Report::Started => f.write_str(STARTED),
            Report::Stopped => f.write_str(STOPPED),
        }
    }
}
