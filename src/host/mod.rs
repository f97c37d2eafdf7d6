//! Minimal host runtime the plugin attaches to.
//!
//! The host owns a route table and a node registry. It starts out not ready;
//! once `HostHandle::mark_ready` is called every `ReadySignal` resolves with
//! the server, which is how plugins that load early get their registration in.

pub mod node;

use crate::error::{Error, Result};
use axum::{extract::State, routing::get, Json, Router};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use node::{InputSpec, Node, NodeInfo, NodeInputs};

#[derive(Default)]
pub struct HostServer {
    routes: Mutex<Router>,
    nodes: RwLock<BTreeMap<String, Arc<dyn Node>>>,
}

impl HostServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_routes(&self, router: Router) {
        let mut routes = self.routes.lock();
        *routes = std::mem::take(&mut *routes).merge(router);
    }

    pub fn register_node(&self, node: Arc<dyn Node>) {
        let name = node.info().name;
        if self.nodes.write().insert(name.clone(), node).is_some() {
            tracing::warn!("Node type '{}' registered twice, keeping the latest", name);
        } else {
            tracing::info!("Registered node type '{}'", name);
        }
    }

    pub fn node_info(&self) -> Vec<NodeInfo> {
        self.nodes.read().values().map(|n| n.info()).collect()
    }

    /// Runs a node on the calling thread.
    pub fn execute_node(&self, name: &str, inputs: &NodeInputs) -> Result<Vec<Value>> {
        let node = self
            .nodes
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NodeNotFound(name.to_string()))?;

        tracing::debug!("Executing node '{}'", name);
        node.execute(inputs)
    }

    /// Plugin routes are served both at the root and under `/api`.
    pub fn router(self: &Arc<Self>) -> Router {
        let plugins = self.routes.lock().clone();

        Router::new()
            .route("/object_info", get(object_info_handler))
            .with_state(self.clone())
            .merge(plugins.clone())
            .nest("/api", plugins)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

async fn object_info_handler(State(server): State<Arc<HostServer>>) -> Json<Vec<NodeInfo>> {
    Json(server.node_info())
}

/// The host's side of readiness. Cloning shares the same signal.
#[derive(Clone)]
pub struct HostHandle {
    tx: Arc<watch::Sender<Option<Arc<HostServer>>>>,
}

impl HostHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn instance(&self) -> Option<Arc<HostServer>> {
        self.tx.borrow().clone()
    }

    pub fn mark_ready(&self, server: Arc<HostServer>) {
        tracing::info!("Host server ready");
        self.tx.send_replace(Some(server));
    }

    pub fn subscribe(&self) -> ReadySignal {
        ReadySignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for HostHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once the host is ready; `None` if every `HostHandle` is gone first.
pub struct ReadySignal {
    rx: watch::Receiver<Option<Arc<HostServer>>>,
}

impl ReadySignal {
    pub async fn ready(mut self) -> Option<Arc<HostServer>> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(server) => server.clone(),
            Err(_) => None,
        }
    }
}
