use std::path::{Path, PathBuf};

use extpub_core::CleanupPolicy;
use extpub_xcode::Platform;

use crate::cli::Cli;
use crate::error::PublishError;

const XCODE_DIR_IN_REPO: &str = "dist/build/uBOLite.safari/xcode";
const PROJECT_BUNDLE: &str = "uBlock Origin Lite.xcodeproj";
const PROJECT_FILE: &str = "project.pbxproj";
const RESOURCES_DIR: &str = "Shared (Extension)/Resources";
const SCHEME_PREFIX: &str = "uBlock Origin Lite";
const ARCHIVE_PREFIX: &str = "uBOLite";

/// Where things live inside the Xcode wrapper project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub xcode_dir: PathBuf,
}

impl ProjectLayout {
    #[must_use]
    pub fn new(xcode_dir: PathBuf) -> Self {
        Self { xcode_dir }
    }

    #[must_use]
    pub fn for_repo(repo_root: &Path) -> Self {
        Self::new(repo_root.join(XCODE_DIR_IN_REPO))
    }

    #[must_use]
    pub fn resources_dir(&self) -> PathBuf {
        self.xcode_dir.join(RESOURCES_DIR)
    }

    #[must_use]
    pub fn project_bundle(&self) -> PathBuf {
        self.xcode_dir.join(PROJECT_BUNDLE)
    }

    #[must_use]
    pub fn project_file(&self) -> PathBuf {
        self.project_bundle().join(PROJECT_FILE)
    }

    #[must_use]
    pub fn scheme(platform: Platform) -> String {
        format!("{SCHEME_PREFIX} ({})", platform.display_name())
    }

    #[must_use]
    pub fn export_options(&self, platform: Platform) -> PathBuf {
        self.xcode_dir
            .join(format!("exportOptions.{}.plist", platform.slug()))
    }

    /// Archive path for `platform`, without the `.xcarchive` suffix.
    #[must_use]
    pub fn archive_path(workspace: &Path, platform: Platform) -> PathBuf {
        workspace.join(format!("{ARCHIVE_PREFIX}.{}", platform.slug()))
    }

    #[must_use]
    pub fn export_path(workspace: &Path, platform: Platform) -> PathBuf {
        workspace.join(format!("export.{}", platform.slug()))
    }
}

/// Where exported builds go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    /// Upload the macOS export to the release and drop the source asset.
    GitHub,
    /// Export only.
    Other(String),
}

impl PublishTarget {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("github") {
            Self::GitHub
        } else {
            Self::Other(value.to_string())
        }
    }
}

/// Everything a run needs, resolved once at start-up.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub tag: String,
    pub asset: String,
    pub owner: String,
    pub repo: String,
    /// API root override; `None` talks to api.github.com.
    pub api_url: Option<String>,
    pub platforms: Vec<Platform>,
    pub publish: Option<PublishTarget>,
    pub distribute: bool,
    pub cleanup: CleanupPolicy,
    pub layout: ProjectLayout,
}

impl PublishConfig {
    /// Validate the parsed arguments. `repo_root` is only consulted when no
    /// `xcodeDir` was given.
    ///
    /// # Errors
    /// Returns [`PublishError::MissingArgument`] for an absent required value
    /// and [`PublishError::RepoRootNotFound`] when the project directory
    /// cannot be derived.
    pub fn from_cli(
        cli: &Cli,
        cwd: &Path,
        repo_root: Option<&Path>,
    ) -> Result<Self, PublishError> {
        let tag = required(cli.tag.as_deref(), "tag")?;
        let asset = required(cli.asset.as_deref(), "asset")?;
        let owner = required(cli.github_owner.as_deref(), "githubOwner")?;
        let repo = required(cli.github_repo.as_deref(), "githubRepo")?;

        let layout = match (&cli.xcode_dir, repo_root) {
            (Some(dir), _) => ProjectLayout::new(cwd.join(dir)),
            (None, Some(root)) => ProjectLayout::for_repo(root),
            (None, None) => return Err(PublishError::RepoRootNotFound(cwd.to_path_buf())),
        };

        let platforms = Platform::ALL
            .into_iter()
            .filter(|platform| match platform {
                Platform::Ios => cli.ios,
                Platform::Macos => cli.macos,
            })
            .collect();

        let cleanup = if cli.keep {
            CleanupPolicy::Keep
        } else if cli.keep_on_failure {
            CleanupPolicy::KeepOnFailure
        } else {
            CleanupPolicy::Remove
        };

        Ok(Self {
            tag,
            asset,
            owner,
            repo,
            api_url: cli.github_api_url.clone(),
            platforms,
            publish: cli.publish.as_deref().map(PublishTarget::parse),
            distribute: cli.distribute,
            cleanup,
            layout,
        })
    }

    #[must_use]
    pub fn exports(&self) -> bool {
        self.publish.is_some()
    }

    /// Whether `platform`'s export is uploaded. Only macOS builds go to the
    /// release.
    #[must_use]
    pub fn uploads(&self, platform: Platform) -> bool {
        platform == Platform::Macos && self.publish == Some(PublishTarget::GitHub)
    }
}

fn required(value: Option<&str>, name: &'static str) -> Result<String, PublishError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(PublishError::MissingArgument(name))
}
