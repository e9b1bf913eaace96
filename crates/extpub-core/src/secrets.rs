use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use thiserror::Error;

pub const SECRETS_FILE_NAME: &str = "ubo_secrets";

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("No ubo_secrets file found above {}", .start.display())]
    NotFound { start: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Credentials read from the secrets file. Keys other than the token are
/// kept as-is.
#[derive(Clone, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    github_token: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Secrets {
    #[must_use]
    pub fn github_token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Find the nearest secrets file between `start` and `home` and parse it.
///
/// # Errors
/// Returns [`SecretsError::NotFound`] when no directory inside `home` on the
/// way up from `start` holds the file, or a read/parse error for the file
/// that was found.
pub fn load_secrets(start: &Path, home: &Path) -> Result<Secrets, SecretsError> {
    let dir = extpub_platform::find_ancestor_with(start, home, SECRETS_FILE_NAME).ok_or_else(
        || SecretsError::NotFound {
            start: start.to_path_buf(),
        },
    )?;
    let path = dir.join(SECRETS_FILE_NAME);
    info!("Found secrets in {}", path.display());

    let text = std::fs::read_to_string(&path).map_err(|source| SecretsError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SecretsError::Parse { path, source })
}
