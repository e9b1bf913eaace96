use std::path::{Path, PathBuf};

use extpub_core::{package_stem, sha256_file, zip_dir};
use extpub_release::{AssetInfo, ReleaseHost};
use log::{info, warn};

use crate::error::PublishError;

pub const UPLOAD_CONTENT_TYPE: &str = "application/zip";

/// Name of the uploaded macOS build for a source asset called `asset_name`.
#[must_use]
pub fn upload_name(asset_name: &str) -> String {
    format!("{}.macos.zip", package_stem(Path::new(asset_name)))
}

/// The `.app` bundle inside an export directory.
///
/// # Errors
/// Returns [`PublishError::AppBundleNotFound`] when the directory holds no
/// `.app` or cannot be read.
pub fn find_app_bundle(export_dir: &Path) -> Result<PathBuf, PublishError> {
    let not_found = || PublishError::AppBundleNotFound(export_dir.to_path_buf());
    let mut bundles: Vec<PathBuf> = std::fs::read_dir(export_dir)
        .map_err(|_| not_found())?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.extension().is_some_and(|ext| ext == "app"))
        .collect();
    bundles.sort();

    if bundles.len() > 1 {
        warn!(
            "Several app bundles in {}, using {}",
            export_dir.display(),
            bundles[0].display()
        );
    }
    bundles.into_iter().next().ok_or_else(not_found)
}

/// Zip the exported app, upload it next to `source`, then delete `source`.
///
/// The source asset is only deleted once the upload succeeded and, when the
/// host reports one, its digest matches the local file.
///
/// # Errors
/// Returns the first failing step's error. A failed delete after a
/// successful upload is reported as is; the upload is not rolled back.
pub async fn publish_export(
    host: &dyn ReleaseHost,
    tag: &str,
    source: &AssetInfo,
    export_dir: &Path,
    workspace: &Path,
) -> Result<AssetInfo, PublishError> {
    let app = find_app_bundle(export_dir)?;
    let name = upload_name(&source.name);
    let zip_path = workspace.join(&name);

    zip_dir(&app, &zip_path)?;
    let local_digest = sha256_file(&zip_path)?;

    info!("Uploading {name} to release {tag}");
    let uploaded = host
        .upload_asset(tag, &zip_path, &name, UPLOAD_CONTENT_TYPE)
        .await?;

    if let Some(remote_digest) = uploaded.sha256()
        && remote_digest != local_digest
    {
        return Err(PublishError::DigestMismatch {
            name: uploaded.name,
            local: local_digest,
            remote: remote_digest,
        });
    }

    info!("Deleting {} from release {tag}", source.name);
    host.delete_asset(&source.url).await?;
    Ok(uploaded)
}
