use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    /// Host the reserved ports are bound on and reported with
    #[serde(default = "default_advertise_host")]
    pub advertise_host: String,

    /// Host used when probing the client port for readiness
    #[serde(default = "default_probe_host")]
    pub probe_host: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            advertise_host: default_advertise_host(),
            probe_host: default_probe_host(),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.advertise_host.trim().is_empty() {
            return Err(invalid("network.advertise_host cannot be empty"));
        }
        if self.probe_host.trim().is_empty() {
            return Err(invalid("network.probe_host cannot be empty"));
        }
        Ok(())
    }
}

fn default_advertise_host() -> String {
    "127.0.0.1".to_string()
}
fn default_probe_host() -> String {
    "127.0.0.1".to_string()
}
