//! Output directory lifecycle: created once per run, never reused silently.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum OutdirError {
    #[error("output directory {0} already exists, use --force to overwrite it")]
    Exists(PathBuf),

    #[error("{0} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Create `path` for a fresh run.
///
/// An existing directory is an error unless `force` is set, in which case it
/// is removed and recreated empty. Without `force` the directory is left
/// untouched.
///
/// # Errors
///
/// Returns `OutdirError::Exists` when the directory exists and `force` is
/// false, `OutdirError::NotADirectory` when the path is a file, or an IO
/// variant when removal or creation fails.
pub fn prepare_output_dir(path: &Path, force: bool) -> Result<(), OutdirError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(OutdirError::NotADirectory(path.to_path_buf()));
        }
        if !force {
            return Err(OutdirError::Exists(path.to_path_buf()));
        }
        warn!("Removing existing output directory {}", path.display());
        std::fs::remove_dir_all(path).map_err(|source| OutdirError::Remove {
            path: path.to_path_buf(),
            source,
        })?;
    }

    create_dir(path)?;
    info!("Writing results to {}", path.display());
    Ok(())
}

/// Create a directory (and parents) below the output directory
///
/// # Errors
///
/// Returns `OutdirError::Create` if the directory cannot be created.
pub fn create_dir(path: &Path) -> Result<(), OutdirError> {
    std::fs::create_dir_all(path).map_err(|source| OutdirError::Create {
        path: path.to_path_buf(),
        source,
    })
}
