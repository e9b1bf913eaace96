use std::path::PathBuf;

use extpub_core::{ArchiveError, PatchError, StageError};
use extpub_platform::AppPathsError;
use extpub_release::{ReleaseError, StatusCode};
use extpub_xcode::ToolchainError;
use thiserror::Error;

/// Everything that can end a publishing run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Need secrets")]
    MissingSecrets,

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("No repository root found above {}", .0.display())]
    RepoRootNotFound(PathBuf),

    #[error(transparent)]
    Paths(#[from] AppPathsError),

    #[error("Failed to read the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("No .app bundle in {}", .0.display())]
    AppBundleNotFound(PathBuf),

    #[error("Uploaded {name} has digest {remote}, expected {local}")]
    DigestMismatch {
        name: String,
        local: String,
        remote: String,
    },
}

impl PublishError {
    /// Whether the run stopped because something it needed was not there:
    /// a release, an asset, a file.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        match self {
            Self::Release(ReleaseError::AssetNotFound { .. }) | Self::AppBundleNotFound(_) => true,
            Self::Release(error) => error.status() == Some(StatusCode::NOT_FOUND),
            Self::Patch(PatchError::FileNotFound(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use extpub_core::PatchError;
    use extpub_release::ReleaseError;

    use super::PublishError;

    #[test]
    fn missing_secrets_message_is_short() {
        assert_eq!(PublishError::MissingSecrets.to_string(), "Need secrets");
    }

    #[test]
    fn wrapped_errors_keep_their_message() {
        let error = PublishError::from(ReleaseError::AssetNotFound {
            tag: "v1.2.3".to_string(),
            name_part: "safari".to_string(),
        });

        assert_eq!(
            error.to_string(),
            "No asset matching 'safari' in release v1.2.3"
        );
        assert!(error.is_absence());
    }

    #[test]
    fn missing_project_file_is_absence() {
        let error = PublishError::from(PatchError::FileNotFound(PathBuf::from(
            "/repo/project.pbxproj",
        )));

        assert!(error.is_absence());
        assert!(!PublishError::MissingArgument("tag").is_absence());
    }
}
