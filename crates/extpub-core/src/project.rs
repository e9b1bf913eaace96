use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::warn;
use regex::{Captures, Regex};
use thiserror::Error;

pub const MARKETING_VERSION_KEY: &str = "MARKETING_VERSION";
pub const BUILD_NUMBER_KEY: &str = "CURRENT_PROJECT_VERSION";

static MARKETING_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(MARKETING_VERSION\s*=\s*)([^;\n]*);")
        .expect("marketing version pattern is valid")
});

static BUILD_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(CURRENT_PROJECT_VERSION\s*=\s*)([^;\n]*);")
        .expect("build number pattern is valid")
});

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Project file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("CURRENT_PROJECT_VERSION {0} cannot be incremented")]
    BuildNumberOverflow(u64),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A native project descriptor (`project.pbxproj`) held as text.
pub struct ProjectFile {
    pub path: PathBuf,
    pub content: String,
}

impl ProjectFile {
    /// Read the descriptor at `path`.
    ///
    /// # Errors
    /// Returns an error when the file is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self, PatchError> {
        if !path.is_file() {
            return Err(PatchError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| PatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    #[must_use]
    pub fn marketing_version(&self) -> Option<&str> {
        MARKETING_VERSION_RE
            .captures(&self.content)
            .and_then(|caps| caps.get(2))
            .map(|value| value.as_str().trim())
    }

    #[must_use]
    pub fn build_number(&self) -> Option<u64> {
        BUILD_NUMBER_RE
            .captures(&self.content)
            .and_then(|caps| caps.get(2))
            .and_then(|value| value.as_str().trim().parse().ok())
    }

    /// Compute the edit that stamps `version` into every marketing-version
    /// field and, when `distribute` is set, bumps every build-number field to
    /// one past the current build number (1 when missing or unparseable).
    ///
    /// # Errors
    /// Returns [`PatchError::BuildNumberOverflow`] when the build number is
    /// already at its maximum.
    pub fn patch_versions(
        &self,
        version: &str,
        distribute: bool,
    ) -> Result<ProjectEdit, PatchError> {
        let mut changes = Vec::new();

        let count = MARKETING_VERSION_RE.find_iter(&self.content).count();
        if count == 0 {
            warn!(
                "No {MARKETING_VERSION_KEY} field in {}",
                self.path.display()
            );
        }
        let mut modified = MARKETING_VERSION_RE
            .replace_all(&self.content, |caps: &Captures| format!("{}{version};", &caps[1]))
            .into_owned();
        if modified != self.content {
            changes.push(format!(
                "Set {MARKETING_VERSION_KEY} to {version} ({count} occurrences)"
            ));
        }

        if distribute {
            let current = self.build_number();
            let base = current.unwrap_or(1);
            let next = base
                .checked_add(1)
                .ok_or(PatchError::BuildNumberOverflow(base))?;
            let patched = BUILD_NUMBER_RE
                .replace_all(&modified, |caps: &Captures| format!("{}{next};", &caps[1]))
                .into_owned();
            if patched == modified {
                warn!("No {BUILD_NUMBER_KEY} field in {}", self.path.display());
            } else {
                let mut change = format!("Set {BUILD_NUMBER_KEY} to {next}");
                if let Some(current) = current {
                    let _ = write!(change, " (was {current})");
                }
                changes.push(change);
                modified = patched;
            }
        }

        Ok(ProjectEdit { modified, changes })
    }

    /// Write the edited text back to the descriptor.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn apply_edit(&mut self, edit: &ProjectEdit) -> Result<(), PatchError> {
        fs::write(&self.path, &edit.modified).map_err(|source| PatchError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.content.clone_from(&edit.modified);
        Ok(())
    }
}

pub struct ProjectEdit {
    pub modified: String,
    pub changes: Vec<String>,
}

impl ProjectEdit {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Load the descriptor at `path`, stamp the versions, and save it.
///
/// # Errors
/// Returns an error if the descriptor cannot be read or written.
pub fn patch_project_file(
    path: &Path,
    version: &str,
    distribute: bool,
) -> Result<ProjectEdit, PatchError> {
    let mut project = ProjectFile::load(path)?;
    let edit = project.patch_versions(version, distribute)?;
    if edit.has_changes() {
        project.apply_edit(&edit)?;
    }
    Ok(edit)
}
