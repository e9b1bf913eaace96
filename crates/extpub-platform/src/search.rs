use std::path::{Path, PathBuf};

use log::debug;

pub const REPO_MARKER: &str = ".git";

/// Walk from `start` towards the filesystem root and return the first
/// directory that contains `marker`.
///
/// The walk never leaves `boundary`: a directory that is not `boundary` or
/// one of its descendants is never checked and ends the search.
#[must_use]
pub fn find_ancestor_with(start: &Path, boundary: &Path, marker: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if !current.starts_with(boundary) {
            debug!(
                "Stopped looking for {marker}: {} is outside {}",
                current.display(),
                boundary.display()
            );
            return None;
        }
        if current.join(marker).exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Locate the root of the version-controlled checkout containing `start`.
#[must_use]
pub fn find_repo_root(start: &Path, boundary: &Path) -> Option<PathBuf> {
    find_ancestor_with(start, boundary, REPO_MARKER)
}
