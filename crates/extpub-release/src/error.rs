use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("failed to build GitHub client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("GitHub token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("Invalid API base URL: {0}")]
    InvalidApiBase(String),

    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed with HTTP {status}{body_snippet}")]
    HttpStatus {
        operation: &'static str,
        status: reqwest::StatusCode,
        body_snippet: String,
    },

    #[error("failed to parse {operation} response: {source}")]
    Parse {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("No asset matching '{name_part}' in release {tag}")]
    AssetNotFound { tag: String, name_part: String },

    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseError {
    pub(crate) fn request(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Request { operation, source }
    }

    pub(crate) fn parse(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Parse { operation, source }
    }

    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Whether the host answered with a status code, as opposed to a
    /// transport or local failure.
    #[must_use]
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
