use crate::error::{Error, Result};
use crate::model::hub::HubClient;
use crate::model::ModelDescriptor;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct ModelDownloader {
    client: Arc<dyn HubClient>,
    models_dir: PathBuf,
}

impl ModelDownloader {
    pub fn new(client: Arc<dyn HubClient>, models_dir: PathBuf) -> Self {
        Self { client, models_dir }
    }

    /// Fetches one descriptor, reporting the outcome as a status line.
    ///
    /// Blocks for the whole transfer. An existing target short-circuits without
    /// touching the hub; every failure is folded into the returned string.
    pub fn download(&self, descriptor: &ModelDescriptor) -> String {
        let local_path = descriptor.resolve_path(&self.models_dir);

        if local_path.exists() {
            tracing::info!("Skipping {}, already at {:?}", descriptor.filename, local_path);
            return format!("File already exists at {}", local_path.display());
        }

        match self.fetch_into(descriptor, &local_path) {
            Ok(()) => {
                tracing::info!("Downloaded {} to {:?}", descriptor.filename, local_path);
                format!(
                    "Successfully downloaded {} to {}",
                    descriptor.filename,
                    local_path.display()
                )
            }
            Err(e) => {
                tracing::error!("Error downloading {}: {}", descriptor.filename, e);
                format!("Error downloading {}: {}", descriptor.filename, e)
            }
        }
    }

    fn fetch_into(&self, descriptor: &ModelDescriptor, local_path: &Path) -> Result<()> {
        let parent = local_path
            .parent()
            .ok_or_else(|| Error::DownloadFailed(format!("Invalid local path: {:?}", local_path)))?;
        fs::create_dir_all(parent)?;

        let landed = self.client.fetch(
            &descriptor.repo_id,
            &descriptor.subfolder,
            &descriptor.filename,
            parent,
        )?;

        if landed != local_path {
            tracing::debug!("Moving {:?} to {:?}", landed, local_path);
            fs::rename(&landed, local_path)?;
        }

        Ok(())
    }
}
