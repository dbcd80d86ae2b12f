//! Private working directory of one agent.
//!
//! Created when the agent is built, handed to every consensus process the
//! agent launches as its data and log directory, and deleted once at final
//! teardown.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::utils::file_io::remove_tree;
use crate::Result;
use crate::SystemError;
use crate::WorkDirConfig;

const NAME_ALPHABET: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];
const NAME_LEN: usize = 12;
const CREATE_ATTEMPTS: usize = 8;

#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    removed: bool,
}

impl WorkDir {
    /// Creates `<root>/<prefix><random><suffix>`, creating `root` if needed.
    pub fn create(config: &WorkDirConfig) -> Result<Self> {
        fs::create_dir_all(&config.root).map_err(|source| SystemError::Path {
            path: config.root.clone(),
            source,
        })?;

        let mut last_err = None;
        for _ in 0..CREATE_ATTEMPTS {
            let name = format!(
                "{}{}{}",
                config.prefix,
                nanoid::nanoid!(NAME_LEN, &NAME_ALPHABET),
                config.suffix
            );
            let path = config.root.join(name);
            match fs::create_dir(&path) {
                Ok(()) => {
                    info!(?path, "created working directory");
                    return Ok(Self {
                        path,
                        removed: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(?path, "working directory name taken, retrying");
                    last_err = Some((path, e));
                }
                Err(source) => return Err(SystemError::Path { path, source }.into()),
            }
        }

        let (path, source) = last_err.unwrap_or_else(|| {
            (
                config.root.clone(),
                std::io::Error::new(ErrorKind::AlreadyExists, "no free directory name"),
            )
        });
        Err(SystemError::Path { path, source }.into())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Deletes the whole tree. Safe to call again after success or failure.
    pub async fn destroy(&mut self) -> Result<()> {
        remove_tree(&self.path).await?;
        if !self.removed {
            info!(path = ?self.path, "removed working directory");
        }
        self.removed = true;
        Ok(())
    }
}
