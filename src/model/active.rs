use crate::error::Result;
use crate::model::catalog::ModelStatus;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const ENABLED_MODELS_KEY: &str = "enabled_models";
pub const MODEL_STATUS_KEY: &str = "model_status";

/// The user's enabled-model selection, loaded once and written through on update.
#[derive(Debug)]
pub struct ActiveConfigStore {
    path: PathBuf,
    document: RwLock<Value>,
}

impl ActiveConfigStore {
    pub fn load(path: PathBuf) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let document = match serde_json::from_str::<Value>(&content) {
                Ok(document) => {
                    tracing::debug!("Loaded active config from {:?}", path);
                    document
                }
                // Left on disk untouched until the next update replaces it.
                Err(e) => {
                    tracing::warn!("Ignoring unreadable active config {:?}: {}", path, e);
                    json!({ ENABLED_MODELS_KEY: [] })
                }
            };
            return Ok(Self {
                path,
                document: RwLock::new(document),
            });
        }

        let store = Self {
            path,
            document: RwLock::new(json!({ ENABLED_MODELS_KEY: [] })),
        };
        store.save(&store.document.read())?;
        tracing::info!("Created active config at {:?}", store.path);
        Ok(store)
    }

    pub fn document(&self) -> Value {
        self.document.read().clone()
    }

    /// Replaces the whole document. The derived status field is dropped so it never hits disk.
    pub fn replace(&self, mut document: Value) -> Result<()> {
        if let Value::Object(map) = &mut document {
            map.remove(MODEL_STATUS_KEY);
        }

        let mut current = self.document.write();
        self.save(&document)?;
        *current = document;
        Ok(())
    }

    pub fn enabled_models(&self) -> Vec<String> {
        self.document
            .read()
            .get(ENABLED_MODELS_KEY)
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The stored document with a freshly computed `model_status` attached.
    pub fn with_status(&self, status: BTreeMap<String, ModelStatus>) -> Result<Value> {
        let mut map = match self.document() {
            Value::Object(map) => map,
            _ => {
                let mut map = Map::new();
                map.insert(ENABLED_MODELS_KEY.to_string(), json!([]));
                map
            }
        };
        map.insert(MODEL_STATUS_KEY.to_string(), serde_json::to_value(status)?);
        Ok(Value::Object(map))
    }

    fn save(&self, document: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(document)?)?;
        Ok(())
    }
}
