use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One downloadable file: where it lives on the hub and where it goes on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub repo_id: String,
    #[serde(default)]
    pub subfolder: String,
    pub filename: String,
    pub local_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model_path: Option<String>,
}

impl ModelDescriptor {
    /// Absolute `local_path` is taken as-is, relative ones join the base path.
    pub fn resolve_path(&self, default_base: &Path) -> PathBuf {
        let local = Path::new(&self.local_path);
        if local.is_absolute() {
            return local.to_path_buf();
        }

        match &self.base_model_path {
            Some(base) => Path::new(base).join(local),
            None => default_base.join(local),
        }
    }

    pub fn basename(&self) -> &str {
        self.local_path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.local_path)
    }

    pub fn matches(&self, model_name: &str) -> bool {
        self.local_path.contains(model_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub downloaded: bool,
    pub path: String,
}

/// File-backed catalog. Every query re-reads the file.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
    models_dir: PathBuf,
}

impl Catalog {
    pub fn new(path: PathBuf, models_dir: PathBuf) -> Self {
        Self { path, models_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn load(&self) -> Result<Vec<ModelDescriptor>> {
        if !self.path.exists() {
            return Err(Error::CatalogNotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let descriptors: Vec<ModelDescriptor> = serde_json::from_str(&content)?;
        Ok(descriptors)
    }

    pub fn find_matches(&self, model_name: &str) -> Result<Vec<ModelDescriptor>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|d| d.matches(model_name))
            .collect())
    }

    pub fn find_first(&self, model_name: &str) -> Result<ModelDescriptor> {
        self.load()?
            .into_iter()
            .find(|d| d.matches(model_name))
            .ok_or_else(|| Error::ModelNotFound(model_name.to_string()))
    }

    /// One line per matching descriptor, in catalog order.
    pub fn check_downloads(&self, model_name: &str) -> Result<String> {
        let lines: Vec<String> = self
            .find_matches(model_name)?
            .iter()
            .map(|d| {
                if d.resolve_path(&self.models_dir).exists() {
                    format!("✓ {} is downloaded", model_name)
                } else {
                    format!("✗ {} is not downloaded", model_name)
                }
            })
            .collect();

        if lines.is_empty() {
            return Ok(Error::ModelNotFound(model_name.to_string()).to_string());
        }

        Ok(lines.join("\n"))
    }

    /// Live on-disk state keyed by file basename.
    pub fn model_status(&self) -> Result<BTreeMap<String, ModelStatus>> {
        Ok(self
            .load()?
            .iter()
            .map(|d| {
                let path = d.resolve_path(&self.models_dir);
                (
                    d.basename().to_string(),
                    ModelStatus {
                        downloaded: path.exists(),
                        path: path.to_string_lossy().into_owned(),
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn descriptor(local_path: &str) -> ModelDescriptor {
        ModelDescriptor {
            repo_id: "hal-fun/models".to_string(),
            subfolder: "weights".to_string(),
            filename: local_path.rsplit('/').next().unwrap().to_string(),
            local_path: local_path.to_string(),
            base_model_path: None,
        }
    }

    pub(crate) fn write_catalog(path: &Path, descriptors: &[ModelDescriptor]) {
        fs::write(path, serde_json::to_string_pretty(descriptors).unwrap()).unwrap();
    }

    fn sample_catalog(dir: &Path) -> Catalog {
        let path = dir.join("model_config.json");
        write_catalog(
            &path,
            &[descriptor("a/b/model1.bin"), descriptor("a/b/model2.bin")],
        );
        Catalog::new(path, dir.join("models"))
    }

    #[test]
    fn test_missing_catalog_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(tmp.path().join("missing.json"), tmp.path().to_path_buf());

        assert!(matches!(catalog.load(), Err(Error::CatalogNotFound(_))));
    }

    #[test]
    fn test_substring_lookup() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = sample_catalog(tmp.path());

        let matches = catalog.find_matches("model1").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].local_path, "a/b/model1.bin");

        let matches = catalog.find_matches("model").unwrap();
        assert_eq!(matches.len(), 2);

        let first = catalog.find_first("model").unwrap();
        assert_eq!(first.local_path, "a/b/model1.bin");

        assert!(matches!(
            catalog.find_first("vae"),
            Err(Error::ModelNotFound(name)) if name == "vae"
        ));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/srv/models");
        let mut d = descriptor("checkpoints/sd.safetensors");
        assert_eq!(d.resolve_path(base), PathBuf::from("/srv/models/checkpoints/sd.safetensors"));

        d.base_model_path = Some("/data".to_string());
        assert_eq!(d.resolve_path(base), PathBuf::from("/data/checkpoints/sd.safetensors"));

        d.local_path = "/abs/sd.safetensors".to_string();
        assert_eq!(d.resolve_path(base), PathBuf::from("/abs/sd.safetensors"));
    }

    #[test]
    fn test_subfolder_defaults_to_empty() {
        let json = r#"[{"repo_id": "r", "filename": "f.bin", "local_path": "x/f.bin"}]"#;
        let descriptors: Vec<ModelDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(descriptors[0].subfolder, "");
        assert!(descriptors[0].base_model_path.is_none());
    }

    #[test]
    fn test_check_downloads() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = sample_catalog(tmp.path());

        let model1 = tmp.path().join("models/a/b/model1.bin");
        fs::create_dir_all(model1.parent().unwrap()).unwrap();
        fs::write(&model1, b"weights").unwrap();

        assert_eq!(
            catalog.check_downloads("model").unwrap(),
            "✓ model is downloaded\n✗ model is not downloaded"
        );
        assert_eq!(
            catalog.check_downloads("lora").unwrap(),
            "No matching models found for lora"
        );
    }

    #[test]
    fn test_model_status_keys_by_basename() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = sample_catalog(tmp.path());

        let model2 = tmp.path().join("models/a/b/model2.bin");
        fs::create_dir_all(model2.parent().unwrap()).unwrap();
        fs::write(&model2, b"weights").unwrap();

        let status = catalog.model_status().unwrap();
        assert_eq!(status.len(), 2);
        assert!(!status["model1.bin"].downloaded);
        assert!(status["model2.bin"].downloaded);
        assert_eq!(status["model2.bin"].path, model2.to_string_lossy());
    }
}
