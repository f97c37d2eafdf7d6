use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::host::node::input_str;
use crate::host::{InputSpec, Node, NodeInfo, NodeInputs};
use serde_json::{json, Value};

pub const CATEGORY: &str = "model_downloader";

pub const ACTION_CHECK: &str = "check_downloads";
pub const ACTION_DOWNLOAD: &str = "download_selected";

fn status_output(result: Result<String>) -> Vec<Value> {
    let status = result.unwrap_or_else(|e| format!("Error: {}", e));
    vec![json!(status)]
}

fn status_info(name: &str, display_name: &str, required: Vec<InputSpec>) -> NodeInfo {
    NodeInfo {
        name: name.to_string(),
        display_name: display_name.to_string(),
        category: CATEGORY.to_string(),
        required,
        return_types: vec!["STRING".to_string()],
        return_names: vec!["status".to_string()],
    }
}

/// Checks or downloads the catalog entries matching a typed model name.
pub struct ModelDownloaderNode {
    ctx: AppContext,
}

impl ModelDownloaderNode {
    pub const NAME: &'static str = "ModelDownloader";

    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

impl Node for ModelDownloaderNode {
    fn info(&self) -> NodeInfo {
        status_info(
            Self::NAME,
            "Hal.fun Model Downloader",
            vec![
                InputSpec::choice("action", &[ACTION_CHECK, ACTION_DOWNLOAD]),
                InputSpec::string("model_name"),
            ],
        )
    }

    fn execute(&self, inputs: &NodeInputs) -> Result<Vec<Value>> {
        let action = input_str(inputs, "action")?;
        let model_name = input_str(inputs, "model_name")?;

        match action {
            ACTION_CHECK => Ok(status_output(self.ctx.catalog().check_downloads(model_name))),
            ACTION_DOWNLOAD => Ok(status_output(self.ctx.download_by_name_blocking(model_name))),
            other => Err(Error::InvalidInput(format!("Unknown action: {}", other))),
        }
    }
}

/// Downloads everything the user has enabled in the panel.
pub struct EnabledModelsDownloaderNode {
    ctx: AppContext,
}

impl EnabledModelsDownloaderNode {
    pub const NAME: &'static str = "EnabledModelsDownloader";

    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

impl Node for EnabledModelsDownloaderNode {
    fn info(&self) -> NodeInfo {
        status_info(Self::NAME, "Hal.fun Enabled Models Downloader", Vec::new())
    }

    fn execute(&self, _inputs: &NodeInputs) -> Result<Vec<Value>> {
        let result = self.ctx.download_enabled_blocking().map(|statuses| {
            if statuses.is_empty() {
                "No enabled models".to_string()
            } else {
                statuses.join("\n")
            }
        });

        Ok(status_output(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::test_context;
    use crate::model::downloader::tests::FakeHub;
    use std::sync::Arc;

    fn inputs(action: &str, model_name: &str) -> NodeInputs {
        json!({ "action": action, "model_name": model_name })
            .as_object()
            .unwrap()
            .clone()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_download_then_check() {
        let tmp = tempfile::tempdir().unwrap();
        let hub = Arc::new(FakeHub::default());
        let node = ModelDownloaderNode::new(test_context(tmp.path(), hub.clone()));

        let (downloaded, checked) = tokio::task::spawn_blocking(move || {
            let downloaded = node.execute(&inputs(ACTION_DOWNLOAD, "model2")).unwrap();
            let checked = node.execute(&inputs(ACTION_CHECK, "model")).unwrap();
            (downloaded, checked)
        })
        .await
        .unwrap();

        assert!(downloaded[0]
            .as_str()
            .unwrap()
            .starts_with("Successfully downloaded model2.bin"));
        assert_eq!(
            checked[0],
            json!("✗ model is not downloaded\n✓ model is downloaded")
        );
        assert_eq!(hub.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_catalog_becomes_status() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path(), Arc::new(FakeHub::default()));
        std::fs::remove_file(&ctx.config().catalog_path).unwrap();
        let node = ModelDownloaderNode::new(ctx);

        let output = node.execute(&inputs(ACTION_CHECK, "model1")).unwrap();

        assert!(output[0]
            .as_str()
            .unwrap()
            .starts_with("Error: Model config file not found at"));
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let tmp = tempfile::tempdir().unwrap();
        let node = ModelDownloaderNode::new(test_context(tmp.path(), Arc::new(FakeHub::default())));

        assert!(matches!(
            node.execute(&inputs("delete", "model1")),
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_enabled_node_with_empty_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let hub = Arc::new(FakeHub::default());
        let node = EnabledModelsDownloaderNode::new(test_context(tmp.path(), hub.clone()));

        let output = node.execute(&NodeInputs::new()).unwrap();

        assert_eq!(output, vec![json!("No enabled models")]);
        assert_eq!(hub.calls(), 0);
    }
}
