use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Naming and status-wait budgets used by the orchestration helpers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrchestrationConfig {
    /// Instances are named `<name_prefix><index>`
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Weight hint passed on assignment
    #[serde(default = "default_assign_weight")]
    pub assign_weight: u32,

    #[serde(default = "default_create_timeout_ms")]
    pub create_timeout_ms: u64,

    #[serde(default = "default_start_timeout_ms")]
    pub start_timeout_ms: u64,

    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            assign_weight: default_assign_weight(),
            create_timeout_ms: default_create_timeout_ms(),
            start_timeout_ms: default_start_timeout_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

impl OrchestrationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name_prefix.is_empty() {
            return Err(invalid("orchestration.name_prefix cannot be empty"));
        }
        for (name, value) in [
            ("create_timeout_ms", self.create_timeout_ms),
            ("start_timeout_ms", self.start_timeout_ms),
            ("stop_timeout_ms", self.stop_timeout_ms),
        ] {
            if value == 0 {
                return Err(invalid(format!("orchestration.{name} must be at least 1ms")));
            }
        }
        Ok(())
    }

    pub fn instance_name(
        &self,
        index: u32,
    ) -> String {
        format!("{}{}", self.name_prefix, index)
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_millis(self.create_timeout_ms)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

fn default_name_prefix() -> String {
    "server".to_string()
}
fn default_assign_weight() -> u32 {
    50
}
fn default_create_timeout_ms() -> u64 {
    3000
}
fn default_start_timeout_ms() -> u64 {
    5000
}
fn default_stop_timeout_ms() -> u64 {
    3000
}
