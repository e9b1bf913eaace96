use std::path::PathBuf;

use log::debug;
use which::which;

use crate::error::ToolchainError;

pub const XCODEBUILD_ENV: &str = "XCODEBUILD";
const XCODEBUILD_BINARY: &str = "xcodebuild";

/// Locate `xcodebuild`, preferring an explicit `XCODEBUILD` override.
///
/// # Errors
/// Returns [`ToolchainError::NotFound`] when neither the override nor `PATH`
/// yields a binary.
pub fn detect_xcodebuild() -> Result<PathBuf, ToolchainError> {
    let env_path = std::env::var_os(XCODEBUILD_ENV).map(PathBuf::from);
    select_xcodebuild(env_path, which(XCODEBUILD_BINARY).ok())
}

fn select_xcodebuild(
    env_path: Option<PathBuf>,
    path_lookup: Option<PathBuf>,
) -> Result<PathBuf, ToolchainError> {
    if let Some(path) = env_path.filter(|path| !path.as_os_str().is_empty()) {
        debug!("Using {XCODEBUILD_ENV}={}", path.display());
        return Ok(path);
    }
    let path = path_lookup.ok_or(ToolchainError::NotFound)?;
    debug!("Found {XCODEBUILD_BINARY} at {}", path.display());
    Ok(path)
}
