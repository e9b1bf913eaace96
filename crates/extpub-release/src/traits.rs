use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ReleaseError;
use crate::types::{AssetInfo, ReleaseInfo};

/// Operations a release-hosting service must offer to the publisher.
///
/// Every call reaches the host afresh; nothing is cached between calls, so a
/// release modified by another process is always observed as it is now.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    async fn release_info(&self, tag: &str) -> Result<ReleaseInfo, ReleaseError>;

    /// Store the asset body as `dir/<asset name>` and return that path.
    async fn download_asset(&self, asset: &AssetInfo, dir: &Path)
    -> Result<PathBuf, ReleaseError>;

    async fn upload_asset(
        &self,
        tag: &str,
        path: &Path,
        name: &str,
        content_type: &str,
    ) -> Result<AssetInfo, ReleaseError>;

    async fn delete_asset(&self, asset_url: &str) -> Result<(), ReleaseError>;

    async fn find_asset(&self, tag: &str, name_part: &str) -> Result<AssetInfo, ReleaseError> {
        let release = self.release_info(tag).await?;
        release
            .select_asset(name_part)
            .cloned()
            .ok_or_else(|| ReleaseError::AssetNotFound {
                tag: tag.to_string(),
                name_part: name_part.to_string(),
            })
    }
}
