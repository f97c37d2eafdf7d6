use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{ActiveConfigStore, Catalog, HubClient, ModelDescriptor, ModelDownloader};
use crate::runtime::TaskPool;
use serde_json::Value;
use std::sync::Arc;

/// Everything the handlers and nodes share, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<Config>,
    catalog: Catalog,
    active: Arc<ActiveConfigStore>,
    downloader: ModelDownloader,
    pool: TaskPool,
}

impl AppContext {
    pub fn new(config: Config, client: Arc<dyn HubClient>, pool: TaskPool) -> Result<Self> {
        let catalog = Catalog::new(config.catalog_path.clone(), config.models_dir.clone());
        let active = ActiveConfigStore::load(config.active_config_path.clone())?;
        let downloader = ModelDownloader::new(client, config.models_dir.clone());

        tracing::info!("Catalog: {:?}", config.catalog_path);
        tracing::info!("Active config: {:?}", config.active_config_path);
        tracing::info!("Models directory: {:?}", config.models_dir);

        Ok(Self {
            config: Arc::new(config),
            catalog,
            active: Arc::new(active),
            downloader,
            pool,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active(&self) -> &ActiveConfigStore {
        &self.active
    }

    /// Active selection plus live on-disk status for every catalog entry.
    pub fn active_with_status(&self) -> Result<Value> {
        let status = self.catalog.model_status()?;
        self.active.with_status(status)
    }

    pub async fn download(&self, descriptor: ModelDescriptor) -> Result<String> {
        let downloader = self.downloader.clone();
        self.pool.execute(move || downloader.download(&descriptor)).await
    }

    /// Blocking counterpart of [`AppContext::download`] for node execution.
    pub fn download_blocking(&self, descriptor: ModelDescriptor) -> Result<String> {
        let downloader = self.downloader.clone();
        self.pool.execute_sync(move || downloader.download(&descriptor))
    }

    /// First catalog match for `model_name`, downloaded synchronously.
    pub fn download_by_name_blocking(&self, model_name: &str) -> Result<String> {
        match self.catalog.find_first(model_name) {
            Ok(descriptor) => self.download_blocking(descriptor),
            Err(Error::ModelNotFound(_)) => {
                Ok(Error::ModelNotFound(model_name.to_string()).to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// Downloads every catalog entry whose basename is enabled, in catalog order.
    pub fn download_enabled_blocking(&self) -> Result<Vec<String>> {
        let enabled = self.active.enabled_models();
        self.catalog
            .load()?
            .into_iter()
            .filter(|d| enabled.iter().any(|name| name == d.basename()))
            .map(|d| self.download_blocking(d))
            .collect()
    }
}
