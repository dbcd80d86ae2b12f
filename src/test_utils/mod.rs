//! Shared helpers for unit tests: isolated configs, a loopback consensus
//! server stand-in and recording reporters.
mod common;
mod mock;

pub use common::*;
pub use mock::*;
