use serde::Deserialize;
use serde::Serialize;

/// External consensus server launched by [`crate::CommandLauncher`].
///
/// An empty `program` means no external binary is configured.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessConfig {
    #[serde(default)]
    pub program: String,

    /// Extra arguments placed before `--config <file>`
    #[serde(default)]
    pub args: Vec<String>,

    /// Member config rendered into the working directory on each start
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,

    /// Wait after SIGTERM before the process is killed
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            config_file_name: default_config_file_name(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

fn default_config_file_name() -> String {
    "quorum.toml".to_string()
}

fn default_shutdown_grace_ms() -> u64 {
    2000
}
