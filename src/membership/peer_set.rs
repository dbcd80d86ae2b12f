use std::collections::BTreeMap;
use std::fmt;

use super::Endpoint;
use super::NodeId;
use crate::Result;

/// Peer-facing endpoints of every member in one cluster generation.
///
/// Ids are assigned `0..n-1` strictly by position in the peer list. The
/// numbering does not depend on which member parses the list, so a reordered
/// list renumbers the peers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerSet {
    members: BTreeMap<NodeId, Endpoint>,
}

impl PeerSet {
    /// Parses `host:port,host:port,...`
    ///
    /// Trailing empty members are dropped, so `a:1,b:2,` lists two peers.
    /// Empty members anywhere else are rejected.
    pub fn parse(spec: &str) -> Result<Self> {
        let members = spec.trim_end_matches(',');
        let members = members
            .split(',')
            .enumerate()
            .map(|(i, member)| member.parse::<Endpoint>().map(|e| (i as NodeId, e)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self { members })
    }

    pub fn get(
        &self,
        id: NodeId,
    ) -> Option<&Endpoint> {
        self.members.get(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Endpoint)> {
        self.members.iter().map(|(id, endpoint)| (*id, endpoint))
    }
}

impl fmt::Display for PeerSet {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let joined = self
            .members
            .values()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}
