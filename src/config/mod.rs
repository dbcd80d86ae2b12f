//! Configuration management for the node agent.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod network;
mod orchestration;
mod process;
mod quorum;
mod readiness;
mod workdir;
pub use network::*;
pub use orchestration::*;
pub use process::*;
pub use quorum::*;
pub use readiness::*;
pub use workdir::*;


use std::env;
use std::fmt::Debug;
use std::path::PathBuf;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Main configuration container for one node agent.
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables prefixed with `AGENT__` (highest priority)
#[derive(Serialize, Deserialize, Clone)]
pub struct AgentConfig {
    /// Hosts used for advertising and probing
    #[serde(default)]
    pub network: NetworkConfig,
    /// Readiness poll bounds
    #[serde(default)]
    pub readiness: ReadinessConfig,
    /// Timing parameters handed to the consensus process on start
    #[serde(default)]
    pub quorum: QuorumTimingConfig,
    /// Private working directory placement
    #[serde(default)]
    pub workdir: WorkDirConfig,
    /// Naming and timeouts for the orchestration helpers
    #[serde(default)]
    pub orchestration: OrchestrationConfig,
    /// External consensus server binary
    #[serde(default)]
    pub process: ProcessConfig,
    /// Root directory for agent log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            readiness: ReadinessConfig::default(),
            quorum: QuorumTimingConfig::default(),
            workdir: WorkDirConfig::default(),
            orchestration: OrchestrationConfig::default(),
            process: ProcessConfig::default(),
            log_dir: default_log_dir(),
        }
    }
}

impl Debug for AgentConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("network", &self.network)
            .field("readiness", &self.readiness)
            .field("quorum", &self.quorum)
            .finish()
    }
}

impl AgentConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call `validate()` once all overrides are applied.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/agent.toml");
    /// std::env::set_var("AGENT__READINESS__ATTEMPTS", "10");
    /// let cfg = AgentConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.network.validate()?;
        self.readiness.validate()?;
        self.quorum.validate()?;
        self.workdir.validate()?;
        self.orchestration.validate()?;
        if self.log_dir.as_os_str().is_empty() {
            return Err(invalid("log_dir path cannot be empty"));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("AGENT")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

pub(super) fn invalid(msg: impl Into<String>) -> Error {
    Error::Config(ConfigError::Message(msg.into()))
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}
