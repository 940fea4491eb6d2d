use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{FileGateway, GatewayError, rename_target};

/// An in-memory filesystem for driving the session without touching disk.
///
/// Writes can be made to fail on demand with [`MemoryGateway::fail_writes`].
#[derive(Debug, Default)]
pub struct MemoryGateway {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.lock().insert(path.into(), content.to_string());
        self
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl FileGateway for MemoryGateway {
    fn read_file(&self, path: &Path) -> Result<String, GatewayError> {
        self.lock()
            .get(path)
            .cloned()
            .ok_or_else(|| GatewayError::Read {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), GatewayError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Write {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.lock().insert(path.to_path_buf(), content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rename_file(&self, old_path: &Path, new_name: &str) -> Result<PathBuf, GatewayError> {
        let target = rename_target(old_path, new_name);
        let mut files = self.lock();
        let fail = |kind| GatewayError::Rename {
            from: old_path.to_path_buf(),
            to: target.clone(),
            source: io::Error::from(kind),
        };
        if files.contains_key(&target) {
            return Err(fail(io::ErrorKind::AlreadyExists));
        }
        let content = files
            .remove(old_path)
            .ok_or_else(|| fail(io::ErrorKind::NotFound))?;
        files.insert(target.clone(), content);
        Ok(target)
    }
}
