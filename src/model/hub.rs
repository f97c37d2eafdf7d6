use crate::error::{Error, Result};
use hf_hub::api::sync::ApiBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of the scratch cache created inside the destination directory for one fetch.
const STAGING_PREFIX: &str = ".hf-download";

/// The byte transfer behind a download.
///
/// Implementations block until the file is on disk and return the path where it
/// landed, which the caller relocates if it differs from the wanted path.
pub trait HubClient: Send + Sync {
    fn fetch(&self, repo_id: &str, subfolder: &str, filename: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Hugging Face hub client laying files out as `<dest_dir>/<subfolder>/<filename>`.
#[derive(Debug, Clone, Default)]
pub struct HfHubClient {
    token: Option<String>,
}

impl HfHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    /// Explicit token, if any. Without one the builder keeps the token saved by `huggingface-cli login`.
    pub fn token_override(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

pub fn remote_path(subfolder: &str, filename: &str) -> String {
    let subfolder = subfolder.trim_matches('/');
    if subfolder.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", subfolder, filename)
    }
}

/// Moves the blob behind a cache snapshot entry to `<dest_dir>/<remote>`.
///
/// Snapshot entries are symlinks into the blob store, so the link is resolved
/// first and the blob itself is moved.
pub fn move_cached_blob(cached: &Path, dest_dir: &Path, remote: &str) -> Result<PathBuf> {
    let blob = fs::canonicalize(cached)?;
    let landed = dest_dir.join(remote);
    if let Some(parent) = landed.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(&blob, &landed)?;
    Ok(landed)
}

impl HubClient for HfHubClient {
    fn fetch(&self, repo_id: &str, subfolder: &str, filename: &str, dest_dir: &Path) -> Result<PathBuf> {
        let remote = remote_path(subfolder, filename);
        // Removed on drop, on success and failure alike.
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dest_dir)?;

        tracing::info!("Fetching {} from {}", remote, repo_id);

        let mut builder = ApiBuilder::new()
            .with_progress(false)
            .with_cache_dir(staging.path().to_path_buf());
        if let Some(token) = self.token_override() {
            builder = builder.with_token(Some(token.to_string()));
        }
        let api = builder
            .build()
            .map_err(|e| Error::DownloadFailed(e.to_string()))?;

        let cached = api
            .model(repo_id.to_string())
            .get(&remote)
            .map_err(|e| Error::DownloadFailed(e.to_string()))?;

        let landed = move_cached_blob(&cached, dest_dir, &remote)?;

        if let Err(e) = staging.close() {
            tracing::warn!("Could not remove staging cache: {}", e);
        }

        Ok(landed)
    }
}
