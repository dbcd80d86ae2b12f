use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Bounds for one readiness poll: `attempts` connects, one per `interval_ms`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ReadinessConfig {
    #[serde(default = "default_attempts")]
    pub attempts: usize,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl ReadinessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(invalid("readiness.attempts must be greater than 0"));
        }
        if self.interval_ms == 0 {
            return Err(invalid("readiness.interval_ms must be at least 1ms"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Upper bound of a full poll
    pub fn budget(&self) -> Duration {
        self.interval() * self.attempts as u32
    }
}

fn default_attempts() -> usize {
    5
}
fn default_interval_ms() -> u64 {
    500
}
