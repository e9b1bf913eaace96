use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, info};
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tokio::io::AsyncWriteExt;

use crate::error::ReleaseError;
use crate::traits::ReleaseHost;
use crate::types::{AssetInfo, ReleaseInfo};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const API_VERSION: &str = "2022-11-28";

/// GitHub releases of one repository, authenticated with a personal token.
#[derive(Clone)]
pub struct GitHubReleases {
    client: reqwest::Client,
    api_base: Url,
    owner: String,
    repo: String,
}

impl GitHubReleases {
    /// Build a client for `owner/repo`.
    ///
    /// # Errors
    /// Returns an error when the token is not a valid header value or the HTTP
    /// client cannot be constructed.
    pub fn new(owner: &str, repo: &str, token: &str) -> Result<Self, ReleaseError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| ReleaseError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("extpub/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(ReleaseError::ClientBuild)?;

        Ok(Self {
            client,
            api_base: parse_api_base(DEFAULT_API_BASE)?,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Point the client at another API root, for example a GitHub
    /// Enterprise server.
    ///
    /// # Errors
    /// Returns [`ReleaseError::InvalidApiBase`] when `api_base` is not an
    /// absolute URL that can carry a path.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ReleaseError> {
        self.api_base = parse_api_base(api_base)?;
        Ok(self)
    }

    /// Release-by-tag endpoint. Each component is a single path segment, so
    /// a tag containing `/`, `?` or `#` is percent-encoded.
    fn release_url(&self, tag: &str) -> Result<Url, ReleaseError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| ReleaseError::InvalidApiBase(self.api_base.to_string()))?
            .pop_if_empty()
            .extend([
                "repos",
                self.owner.as_str(),
                self.repo.as_str(),
                "releases",
                "tags",
                tag,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl ReleaseHost for GitHubReleases {
    async fn release_info(&self, tag: &str) -> Result<ReleaseInfo, ReleaseError> {
        const OPERATION: &str = "fetch release info";

        let url = self.release_url(tag)?;
        info!("Fetching release info for {tag} from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| ReleaseError::request(OPERATION, error))?;
        let response = ensure_success(OPERATION, response).await?;

        response
            .json()
            .await
            .map_err(|error| ReleaseError::parse(OPERATION, error))
    }

    async fn download_asset(
        &self,
        asset: &AssetInfo,
        dir: &Path,
    ) -> Result<PathBuf, ReleaseError> {
        const OPERATION: &str = "download asset";

        info!("Fetching {}", asset.url);
        let response = self
            .client
            .get(&asset.url)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(|error| ReleaseError::request(OPERATION, error))?;
        let response = ensure_success(OPERATION, response).await?;

        let dest = dir.join(safe_file_name(&asset.name));
        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|error| ReleaseError::io("failed to create", &dest, error))?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|error| ReleaseError::request(OPERATION, error))?;
            file.write_all(&chunk)
                .await
                .map_err(|error| ReleaseError::io("failed to write", &dest, error))?;
            downloaded += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|error| ReleaseError::io("failed to flush", &dest, error))?;

        debug!("Downloaded {downloaded} bytes to {}", dest.display());
        Ok(dest)
    }

    async fn upload_asset(
        &self,
        tag: &str,
        path: &Path,
        name: &str,
        content_type: &str,
    ) -> Result<AssetInfo, ReleaseError> {
        const OPERATION: &str = "upload asset";

        let body = tokio::fs::read(path)
            .await
            .map_err(|error| ReleaseError::io("failed to read", path, error))?;

        let release = self.release_info(tag).await?;
        let endpoint = release.upload_endpoint();
        info!("Uploading {name} ({} bytes) to {endpoint}", body.len());

        let response = self
            .client
            .post(endpoint)
            .query(&[("name", name)])
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|error| ReleaseError::request(OPERATION, error))?;
        let response = ensure_success(OPERATION, response).await?;

        response
            .json()
            .await
            .map_err(|error| ReleaseError::parse(OPERATION, error))
    }

    async fn delete_asset(&self, asset_url: &str) -> Result<(), ReleaseError> {
        const OPERATION: &str = "delete asset";

        info!("Deleting {asset_url}");
        let response = self
            .client
            .delete(asset_url)
            .send()
            .await
            .map_err(|error| ReleaseError::request(OPERATION, error))?;
        ensure_success(OPERATION, response).await?;
        Ok(())
    }
}

async fn ensure_success(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ReleaseError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body_snippet = response
        .text()
        .await
        .ok()
        .map(|body| response_snippet(&body, 160))
        .unwrap_or_default();
    Err(ReleaseError::HttpStatus {
        operation,
        status,
        body_snippet,
    })
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.trim().chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}

fn parse_api_base(api_base: &str) -> Result<Url, ReleaseError> {
    Url::parse(api_base)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .ok_or_else(|| ReleaseError::InvalidApiBase(api_base.to_string()))
}

fn safe_file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .unwrap_or("release-asset")
}
