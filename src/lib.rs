//! Remote-controllable test-node agent for consensus-cluster integration
//! tests.
//!
//! A [`NodeAgent`] sits in a test worker, receives text configuration
//! requests from an orchestrator and turns them into lifecycle transitions
//! of one consensus member process:
//! 1. identity request: reserve client and peer ports, report the address pair
//! 2. `"<peers> start"`: launch the member with that peer set, report `started`
//! 3. `"<peers> stop"`: shut the member down, report `stopped`
//! 4. teardown: stop anything live and delete the working directory
//!
//! The consensus member itself is reached only through a [`ProcessLauncher`];
//! the orchestrator only through an [`InstanceManager`].

mod agent;
mod config;
mod errors;
mod membership;
mod network;
mod orchestrator;
mod process;
mod storage;

pub mod metrics;
pub mod protocol;
pub mod utils;

pub use agent::*;
pub use config::*;
pub use errors::*;
pub use membership::*;
pub use network::*;
pub use orchestrator::*;
pub use process::*;
pub use storage::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
