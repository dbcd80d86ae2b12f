use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Timing parameters passed to the consensus process at launch.
///
/// `init_limit` and `sync_limit` are counted in ticks.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct QuorumTimingConfig {
    #[serde(default = "default_tick_time_ms")]
    pub tick_time_ms: u64,

    #[serde(default = "default_init_limit")]
    pub init_limit: u32,

    #[serde(default = "default_sync_limit")]
    pub sync_limit: u32,
}

impl Default for QuorumTimingConfig {
    fn default() -> Self {
        Self {
            tick_time_ms: default_tick_time_ms(),
            init_limit: default_init_limit(),
            sync_limit: default_sync_limit(),
        }
    }
}

impl QuorumTimingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_time_ms == 0 {
            return Err(invalid("quorum.tick_time_ms must be at least 1ms"));
        }
        if self.init_limit == 0 {
            return Err(invalid("quorum.init_limit must be greater than 0"));
        }
        if self.sync_limit == 0 {
            return Err(invalid("quorum.sync_limit must be greater than 0"));
        }
        Ok(())
    }
}

fn default_tick_time_ms() -> u64 {
    2000
}
fn default_init_limit() -> u32 {
    3
}
fn default_sync_limit() -> u32 {
    3
}
