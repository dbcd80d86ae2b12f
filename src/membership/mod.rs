//! Cluster membership as seen by one agent: its own reserved address pair and
//! the peer set of the current cluster generation.

mod endpoint;
mod peer_set;
pub use endpoint::*;
pub use peer_set::*;


/// Identity of a member within one cluster generation
pub type NodeId = u32;
