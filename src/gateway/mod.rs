//! Disk access for the document session.
//!
//! Everything that touches the filesystem goes through [`FileGateway`], so the
//! session can be driven in tests by an in-memory gateway instead of real disk.
//! Writes can be pushed onto a background thread with [`SaveWorker`].

#[cfg(test)]
mod memory;
mod worker;

#[cfg(test)]
pub use memory::MemoryGateway;
pub use worker::{SaveCompletion, SaveWorker};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extension appended to rename targets that have none.
pub const DEFAULT_EXTENSION: &str = "md";

/// An I/O failure, naming the operation and the path involved.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Blocking file operations used by the session.
pub trait FileGateway: Send + Sync {
    /// Read a whole file as UTF-8 text.
    fn read_file(&self, path: &Path) -> Result<String, GatewayError>;

    /// Replace the contents of `path` with `content`.
    fn write_file(&self, path: &Path, content: &str) -> Result<(), GatewayError>;

    /// Move `old_path` to `new_name` in the same directory.
    ///
    /// Returns the final path, see [`rename_target`].
    fn rename_file(&self, old_path: &Path, new_name: &str) -> Result<PathBuf, GatewayError>;
}

/// Where a rename of `old_path` to `new_name` lands.
///
/// `new_name` is resolved against the directory of `old_path`; a name without
/// an extension gets [`DEFAULT_EXTENSION`] appended.
pub fn rename_target(old_path: &Path, new_name: &str) -> PathBuf {
    let dir = old_path.parent().unwrap_or_else(|| Path::new(""));
    let candidate = dir.join(new_name);
    if candidate.extension().is_some() {
        candidate
    } else {
        let mut raw = candidate.into_os_string();
        raw.push(".");
        raw.push(DEFAULT_EXTENSION);
        PathBuf::from(raw)
    }
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskGateway;

impl FileGateway for DiskGateway {
    fn read_file(&self, path: &Path) -> Result<String, GatewayError> {
        fs::read_to_string(path).map_err(|source| GatewayError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), GatewayError> {
        fs::write(path, content).map_err(|source| GatewayError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn rename_file(&self, old_path: &Path, new_name: &str) -> Result<PathBuf, GatewayError> {
        let target = rename_target(old_path, new_name);
        let fail = |source| GatewayError::Rename {
            from: old_path.to_path_buf(),
            to: target.clone(),
            source,
        };
        // fs::rename silently replaces the target on unix
        if target.exists() {
            return Err(fail(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "target already exists",
            )));
        }
        fs::rename(old_path, &target).map_err(fail)?;
        tracing::debug!(from = %old_path.display(), to = %target.display(), "renamed file");
        Ok(target)
    }
}
