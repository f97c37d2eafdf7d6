pub mod active;
pub mod catalog;
pub mod downloader;
pub mod hub;

pub use active::ActiveConfigStore;
pub use catalog::{Catalog, ModelDescriptor};
pub use downloader::ModelDownloader;
pub use hub::{HfHubClient, HubClient};
