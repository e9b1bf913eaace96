mod paths;
mod search;

pub use paths::{AppPaths, AppPathsError};
pub use search::{REPO_MARKER, find_ancestor_with, find_repo_root};
