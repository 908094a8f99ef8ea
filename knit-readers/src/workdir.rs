//! Scoped working-directory changes.
//!
//! knitr resolves its output and figure paths against the process working
//! directory, which is global state. [`WorkdirScope`] serializes every
//! change behind one process-wide lock and undoes it on drop, together with
//! the removal of any intermediate files registered through
//! [`WorkdirScope::track`].

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

static WORKDIR_LOCK: Mutex<()> = Mutex::new(());

/// Holds the working directory at `dir` until dropped.
///
/// On drop, in order: tracked artifacts are removed if they exist, the
/// previous directory is restored, the lock is released. Failures during
/// drop are logged.
pub struct WorkdirScope {
    previous: PathBuf,
    artifacts: Vec<PathBuf>,
    _lock: MutexGuard<'static, ()>,
}

impl WorkdirScope {
    /// Lock, remember the current directory, then switch to `dir`.
    pub fn enter(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let lock = WORKDIR_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        debug!(from = %previous.display(), to = %dir.display(), "entered working directory");

        Ok(Self {
            previous,
            artifacts: Vec::new(),
            _lock: lock,
        })
    }

    /// Directory that will be restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }

    /// Delete `path` (if present) when the scope ends.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.artifacts.push(path.into());
    }
}

impl Drop for WorkdirScope {
    fn drop(&mut self) {
        for artifact in self.artifacts.drain(..) {
            if artifact.exists() {
                match fs::remove_file(&artifact) {
                    Ok(()) => debug!(path = %artifact.display(), "removed intermediate file"),
                    Err(err) => {
                        warn!(path = %artifact.display(), error = %err, "failed to remove intermediate file")
                    }
                }
            }
        }

        if let Err(err) = env::set_current_dir(&self.previous) {
            warn!(
                path = %self.previous.display(),
                error = %err,
                "failed to restore working directory"
            );
        } else {
            debug!(to = %self.previous.display(), "restored working directory");
        }
    }
}
