use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    /// API URL of the asset; used for authenticated download and delete.
    pub url: String,
    #[serde(default)]
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
}

impl AssetInfo {
    /// Lower-case hex SHA-256 reported by the host, if any.
    #[must_use]
    pub fn sha256(&self) -> Option<String> {
        parse_sha256_digest(self.digest.as_deref()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub id: u64,
    pub tag_name: String,
    /// RFC 6570 template, for example
    /// `https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}`.
    pub upload_url: String,
    #[serde(default)]
    pub assets: Vec<AssetInfo>,
}

impl ReleaseInfo {
    /// First asset, in release order, whose name contains `name_part`.
    ///
    /// Several matching assets are tolerated; the first one wins and the
    /// ambiguity is logged.
    #[must_use]
    pub fn select_asset(&self, name_part: &str) -> Option<&AssetInfo> {
        let mut matches = self
            .assets
            .iter()
            .filter(|asset| asset.name.contains(name_part));
        let first = matches.next()?;

        let others: Vec<&str> = matches.map(|asset| asset.name.as_str()).collect();
        if !others.is_empty() {
            warn!(
                "'{name_part}' matches several assets in {}: selected {}, ignored {}",
                self.tag_name,
                first.name,
                others.join(", ")
            );
        }

        Some(first)
    }

    /// Upload endpoint with the URI template suffix removed.
    #[must_use]
    pub fn upload_endpoint(&self) -> &str {
        self.upload_url
            .split_once('{')
            .map_or(self.upload_url.as_str(), |(base, _)| base)
    }
}

fn parse_sha256_digest(digest: &str) -> Option<String> {
    let (algorithm, hash) = digest.split_once(':')?;
    if !algorithm.eq_ignore_ascii_case("sha256") {
        return None;
    }
    if hash.len() != 64 || !hash.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(hash.to_ascii_lowercase())
}
