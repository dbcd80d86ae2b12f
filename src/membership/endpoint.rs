use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::ProtocolError;

/// One `host:port` pair. The host is kept verbatim (name or IP literal).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Segments after the port are ignored
        let mut parts = s.split(':');
        let (Some(host), Some(port)) = (parts.next(), parts.next()) else {
            return Err(ProtocolError::InvalidPeerSpec(s.to_string()).into());
        };
        if host.is_empty() {
            return Err(ProtocolError::InvalidPeerSpec(s.to_string()).into());
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| ProtocolError::InvalidPeerSpec(s.to_string()))?;
        Ok(Endpoint::new(host, port))
    }
}

/// Address pair reserved by an agent on identity assignment.
///
/// Wire form: `<clientHost>:<clientPort>,<peerHost>:<peerPort>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    /// Endpoint the consensus process serves clients on
    pub client: Endpoint,
    /// Endpoint other members use for quorum traffic
    pub peer: Endpoint,
}

impl fmt::Display for NodeAddress {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{},{}", self.client, self.peer)
    }
}

impl FromStr for NodeAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (client, peer) = s
            .split_once(',')
            .ok_or_else(|| ProtocolError::InvalidPeerSpec(s.to_string()))?;
        Ok(NodeAddress {
            client: client.parse()?,
            peer: peer.parse()?,
        })
    }
}
