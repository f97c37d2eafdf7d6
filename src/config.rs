use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CATALOG_FILE: &str = "model_config.json";
const ACTIVE_CONFIG_FILE: &str = "active_config.json";

#[derive(Debug, Clone)]
pub struct Config {
	/// Active selection, inside the per-user config directory.
	pub active_config_path: PathBuf,
	/// Static catalog of downloadable models, edited out-of-band.
	pub catalog_path: PathBuf,
	/// Base for relative `local_path` entries without their own `base_model_path`.
	pub models_dir: PathBuf,
	pub hf_token: Option<String>,
}

impl Config {
	pub fn new() -> crate::error::Result<Self> {
		let project_dirs = ProjectDirs::from("fun", "hal", "hal.fun-downloader")
			.ok_or_else(|| crate::error::Error::ConfigError("Could not determine config directory".to_string()))?;
		let install_dir = install_dir()?;

		Self::with_paths(
			project_dirs.config_dir().to_path_buf(),
			install_dir.join(CATALOG_FILE),
			default_models_dir(&install_dir),
		)
	}

	pub fn from_env() -> crate::error::Result<Self> {
		let mut config = match std::env::var("HAL_FUN_DATA_DIR") {
			Ok(data_dir) => {
				let install_dir = install_dir()?;
				Self::with_paths(
					PathBuf::from(data_dir),
					install_dir.join(CATALOG_FILE),
					default_models_dir(&install_dir),
				)?
			}
			Err(_) => Self::new()?,
		};

		if let Ok(catalog) = std::env::var("HAL_FUN_CATALOG") {
			config.catalog_path = PathBuf::from(catalog);
		}
		if let Ok(models_dir) = std::env::var("HAL_FUN_MODELS_DIR") {
			config.models_dir = PathBuf::from(models_dir);
		}
		config.hf_token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());

		Ok(config)
	}

	pub fn with_paths(data_dir: PathBuf, catalog_path: PathBuf, models_dir: PathBuf) -> crate::error::Result<Self> {
		std::fs::create_dir_all(&data_dir)?;

		Ok(Self {
			active_config_path: data_dir.join(ACTIVE_CONFIG_FILE),
			catalog_path,
			models_dir,
			hf_token: None,
		})
	}
}

fn install_dir() -> crate::error::Result<PathBuf> {
	let exe = std::env::current_exe()?;
	exe.parent()
		.map(Path::to_path_buf)
		.ok_or_else(|| crate::error::Error::ConfigError(format!("Executable has no parent directory: {:?}", exe)))
}

/// The `models` directory sitting next to the install location.
fn default_models_dir(install_dir: &Path) -> PathBuf {
	install_dir.parent().unwrap_or(install_dir).join("models")
}
