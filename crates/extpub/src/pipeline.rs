use std::path::{Path, PathBuf};

use extpub_core::{Workspace, patch_project_file, stage_package};
use extpub_release::{AssetInfo, ReleaseHost};
use extpub_xcode::{ArchiveRequest, BuildToolchain, ExportRequest, Platform};
use log::{info, warn};

use crate::config::{ProjectLayout, PublishConfig};
use crate::error::PublishError;
use crate::publish::publish_export;

/// What a successful run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub version: String,
    pub archives: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
    pub uploaded: Option<AssetInfo>,
    pub kept_workspace: Option<PathBuf>,
}

/// Run every stage in order inside `workspace`, then release the workspace
/// according to its cleanup policy whatever the outcome.
///
/// # Errors
/// Returns the error of the first stage that fails; later stages do not run.
pub async fn run(
    config: &PublishConfig,
    host: &dyn ReleaseHost,
    toolchain: &dyn BuildToolchain,
    workspace: Workspace,
) -> Result<RunSummary, PublishError> {
    let result = run_stages(config, host, toolchain, workspace.path()).await;
    let kept = workspace.finish(result.is_ok());
    if let (Err(_), Some(path)) = (&result, &kept) {
        warn!("Run failed, workspace left at {}", path.display());
    }
    result.map(|summary| RunSummary {
        kept_workspace: kept,
        ..summary
    })
}

async fn run_stages(
    config: &PublishConfig,
    host: &dyn ReleaseHost,
    toolchain: &dyn BuildToolchain,
    workspace: &Path,
) -> Result<RunSummary, PublishError> {
    let asset = host.find_asset(&config.tag, &config.asset).await?;
    info!("Using asset {} from release {}", asset.name, config.tag);

    let package = host.download_asset(&asset, workspace).await?;
    info!("Downloaded {}", package.display());

    let staged = stage_package(&package, workspace, &config.layout.resources_dir())?;
    let version = staged.manifest.version;

    let edit = patch_project_file(&config.layout.project_file(), &version, config.distribute)?;
    for change in &edit.changes {
        info!("{change}");
    }

    let mut summary = RunSummary {
        version,
        ..RunSummary::default()
    };

    for &platform in &config.platforms {
        let archive = build_archive(config, toolchain, workspace, platform).await?;
        summary.archives.push(archive.clone());

        if !config.exports() {
            continue;
        }
        let export = export_archive(config, toolchain, workspace, platform, archive).await?;
        summary.exports.push(export.clone());

        if config.uploads(platform) {
            let uploaded = publish_export(host, &config.tag, &asset, &export, workspace).await?;
            info!("Published {}", uploaded.name);
            summary.uploaded = Some(uploaded);
        }
    }

    Ok(summary)
}

async fn build_archive(
    config: &PublishConfig,
    toolchain: &dyn BuildToolchain,
    workspace: &Path,
    platform: Platform,
) -> Result<PathBuf, PublishError> {
    let request = ArchiveRequest {
        platform,
        project: config.layout.project_bundle(),
        scheme: ProjectLayout::scheme(platform),
        archive_path: ProjectLayout::archive_path(workspace, platform),
    };
    Ok(toolchain.archive(&request).await?)
}

async fn export_archive(
    config: &PublishConfig,
    toolchain: &dyn BuildToolchain,
    workspace: &Path,
    platform: Platform,
    archive_bundle: PathBuf,
) -> Result<PathBuf, PublishError> {
    let request = ExportRequest {
        platform,
        archive_bundle,
        export_path: ProjectLayout::export_path(workspace, platform),
        options_plist: config.layout.export_options(platform),
    };
    Ok(toolchain.export(&request).await?)
}
