use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

const WORKSPACE_PREFIX: &str = "github-asset-";

/// What happens to the workspace when the run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    #[default]
    Remove,
    KeepOnFailure,
    Keep,
}

impl CleanupPolicy {
    #[must_use]
    pub fn keeps(self, succeeded: bool) -> bool {
        match self {
            Self::Remove => false,
            Self::KeepOnFailure => !succeeded,
            Self::Keep => true,
        }
    }
}

/// Per-run temporary directory.
///
/// Dropping the workspace without calling [`Workspace::finish`] counts as a
/// failed run, so an early return or a panic still honors the policy.
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
    policy: CleanupPolicy,
}

impl Workspace {
    /// Create a uniquely named workspace under the system temp root.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn create(policy: CleanupPolicy) -> std::io::Result<Self> {
        Self::create_in(&std::env::temp_dir(), policy)
    }

    /// Create a uniquely named workspace under `root`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn create_in(root: &Path, policy: CleanupPolicy) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)?;
        let path = dir.path().to_path_buf();
        debug!("Created workspace {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            policy,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// End the run, removing or keeping the directory per the policy.
    /// Returns the directory path when it was kept.
    pub fn finish(mut self, succeeded: bool) -> Option<PathBuf> {
        self.release(succeeded)
    }

    fn release(&mut self, succeeded: bool) -> Option<PathBuf> {
        let dir = self.dir.take()?;

        if self.policy.keeps(succeeded) {
            let path = dir.keep();
            info!("Keeping workspace at {}", path.display());
            return Some(path);
        }

        match dir.close() {
            Ok(()) => debug!("Removed workspace {}", self.path.display()),
            Err(error) => warn!(
                "Failed to remove workspace {}: {error}",
                self.path.display()
            ),
        }
        None
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = self.release(false);
    }
}
