use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use log::{debug, error, info, trace};
use tokio::process::Command;

use crate::detection::detect_xcodebuild;
use crate::error::{ToolchainError, stderr_tail};
use crate::toolchain::{ArchiveRequest, BuildToolchain, ExportRequest, archive_args, export_args};

/// [`BuildToolchain`] backed by the `xcodebuild` command-line tool.
#[derive(Debug, Clone)]
pub struct XcodeBuild {
    path: PathBuf,
}

impl XcodeBuild {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// # Errors
    /// Returns [`ToolchainError::NotFound`] when `xcodebuild` is unavailable.
    pub fn detect() -> Result<Self, ToolchainError> {
        detect_xcodebuild().map(Self::new)
    }

    fn build_command(&self, args: &[OsString]) -> Command {
        debug!(
            "Building xcodebuild command: {} {}",
            self.path.display(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let mut cmd = Command::new(&self.path);
        cmd.args(args);
        cmd.kill_on_drop(true);
        cmd
    }

    async fn execute(&self, step: &'static str, args: &[OsString]) -> Result<(), ToolchainError> {
        info!("Running xcodebuild {step}");

        let output = self
            .build_command(args)
            .output()
            .await
            .map_err(|source| ToolchainError::Spawn {
                program: self.path.clone(),
                source,
            })?;

        debug!("xcodebuild {step} exit status: {:?}", output.status);
        trace!("xcodebuild stdout: {}", String::from_utf8_lossy(&output.stdout));
        if !output.stderr.is_empty() {
            trace!("xcodebuild stderr: {}", String::from_utf8_lossy(&output.stderr));
        }

        if output.status.success() {
            Ok(())
        } else {
            let stderr = stderr_tail(&output.stderr);
            error!("xcodebuild {step} failed: {stderr}");
            Err(ToolchainError::CommandFailed {
                step,
                status: output.status.to_string(),
                stderr,
            })
        }
    }
}

#[async_trait]
impl BuildToolchain for XcodeBuild {
    async fn archive(&self, request: &ArchiveRequest) -> Result<PathBuf, ToolchainError> {
        self.execute("archive", &archive_args(request)).await?;
        let bundle = request.archive_bundle();
        info!("Archived {} to {}", request.platform, bundle.display());
        Ok(bundle)
    }

    async fn export(&self, request: &ExportRequest) -> Result<PathBuf, ToolchainError> {
        self.execute("export", &export_args(request)).await?;
        info!(
            "Exported {} to {}",
            request.platform,
            request.export_path.display()
        );
        Ok(request.export_path.clone())
    }
}
