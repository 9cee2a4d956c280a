//! Cache directory management and streaming downloads.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::auth::{HostToken, token_for};
use crate::error::AssetError;
use crate::AssetReference;

/// Extension used for in-flight downloads before the final rename.
const PART_EXTENSION: &str = "part";

/// A directory-backed cache of downloaded asset files.
///
/// The cache is shared across jobs: once an asset name is present it is
/// never fetched again. No locking is performed around the existence check,
/// so two concurrent callers may both download a never-cached asset; the
/// rename on completion keeps that race non-corrupting.
pub struct AssetCache {
    dir: PathBuf,
    tokens: Vec<HostToken>,
    client: reqwest::Client,
}

impl AssetCache {
    /// Create a cache over `dir` with a default HTTP client.
    pub fn new(dir: impl Into<PathBuf>, tokens: Vec<HostToken>) -> Result<Self, AssetError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(dir, tokens, client))
    }

    /// Create a cache over `dir` reusing an existing HTTP client.
    pub fn with_client(
        dir: impl Into<PathBuf>,
        tokens: Vec<HostToken>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            dir: dir.into(),
            tokens,
            client,
        }
    }

    /// Directory backing this cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Guarantee `asset` exists in the cache, downloading it if absent.
    ///
    /// The presence check is by file name only, not content, so an already
    /// cached name is trusted as-is and costs no network round trip.
    pub async fn ensure_present(&self, asset: &AssetReference) -> Result<(), AssetError> {
        let target = self.dir.join(&asset.name);
        if tokio::fs::try_exists(&target).await? {
            debug!(name = %asset.name, "asset already cached");
            return Ok(());
        }
        self.install(asset, &target).await
    }

    async fn install(&self, asset: &AssetReference, target: &Path) -> Result<(), AssetError> {
        let url = Url::parse(&asset.source)
            .map_err(|e| AssetError::invalid_url(&asset.source, e.to_string()))?;

        let mut request = self.client.get(url.clone());
        if let Some(token) = token_for(&self.tokens, &asset.source) {
            request = request.bearer_auth(token);
        }

        info!(name = %asset.name, url = %url, "installing asset");
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AssetError::http_status(response.status(), url.as_str()));
        }

        let part = self.dir.join(format!("{}.{PART_EXTENSION}", asset.name));
        match write_stream(response, &part).await {
            Ok(()) => {
                tokio::fs::rename(&part, target).await?;
                info!(name = %asset.name, path = %target.display(), "asset installed");
                Ok(())
            }
            Err(e) => {
                // Drop the partial file so the next attempt starts clean.
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }

    /// List the stems of all cached asset files, sorted.
    ///
    /// This is the injected view of cache state handed to the job backend in
    /// place of any process-global bookkeeping; `.part` leftovers from
    /// interrupted downloads are ignored.
    pub async fn installed_names(&self) -> Result<Vec<String>, AssetError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if path.extension().is_some_and(|ext| ext == PART_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Stream a response body into `path`, chunk by chunk.
///
/// Memory use is bounded by the transfer chunk size regardless of how large
/// the asset is.
async fn write_stream(response: reqwest::Response, path: &Path) -> Result<(), AssetError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}
