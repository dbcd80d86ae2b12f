use std::fs::create_dir_all;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use tracing::error;
use tracing::trace;

use crate::Result;
use crate::SystemError;

fn path_error(
    path: &Path,
    source: std::io::Error,
) -> SystemError {
    SystemError::Path {
        path: path.to_path_buf(),
        source,
    }
}

pub fn create_parent_dir_if_not_exist(path: &Path) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.exists() {
            if let Err(e) = create_dir_all(parent_dir) {
                error!("Failed to create log directory: {:?}", e);
                return Err(path_error(parent_dir, e).into());
            }
        }
    }
    Ok(())
}

pub fn open_file_for_append(path: PathBuf) -> Result<File> {
    create_parent_dir_if_not_exist(&path)?;
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|e| path_error(&path, e).into())
}

/// Deletes `root` and everything below it, children before parents.
///
/// Symlinks are removed, never followed. A missing `root` is not an error.
pub async fn remove_tree(root: &Path) -> Result<()> {
    let metadata = match tokio::fs::symlink_metadata(root).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(path_error(root, e).into()),
    };
    if !metadata.is_dir() {
        return tokio::fs::remove_file(root).await.map_err(|e| path_error(root, e).into());
    }

    // (dir, children_removed)
    let mut stack = vec![(root.to_path_buf(), false)];
    while let Some((dir, children_removed)) = stack.pop() {
        if children_removed {
            tokio::fs::remove_dir(&dir).await.map_err(|e| path_error(&dir, e))?;
            trace!(?dir, "removed directory");
            continue;
        }

        stack.push((dir.clone(), true));
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| path_error(&dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| path_error(&dir, e))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| path_error(&path, e))?;
            if file_type.is_dir() {
                stack.push((path, false));
            } else {
                tokio::fs::remove_file(&path).await.map_err(|e| path_error(&path, e))?;
            }
        }
    }
    Ok(())
}
