use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Placement of the agent's private working directory:
/// `<root>/<prefix><random><suffix>`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkDirConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for WorkDirConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            prefix: default_prefix(),
            suffix: default_suffix(),
        }
    }
}

impl WorkDirConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(invalid("workdir.root path cannot be empty"));
        }
        if self.prefix.is_empty() {
            return Err(invalid("workdir.prefix cannot be empty"));
        }
        if self.prefix.contains(std::path::MAIN_SEPARATOR)
            || self.suffix.contains(std::path::MAIN_SEPARATOR)
        {
            return Err(invalid("workdir.prefix and workdir.suffix must not contain path separators"));
        }
        Ok(())
    }
}

fn default_root() -> PathBuf {
    std::env::temp_dir()
}
fn default_prefix() -> String {
    "test".to_string()
}
fn default_suffix() -> String {
    ".dir".to_string()
}
