use crate::context::AppContext;
use crate::host::{HostHandle, HostServer};
use crate::nodes::{EnabledModelsDownloaderNode, ModelDownloaderNode};
use crate::server;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub enum Registration {
    Immediate,
    /// Resolves to whether registration happened.
    Deferred(JoinHandle<bool>),
}

/// Attaches routes and node types to the host, now or once it becomes ready.
///
/// Deferral is one-shot: if the host never signals readiness nothing is registered.
pub fn install(ctx: &AppContext, host: &HostHandle) -> Registration {
    tracing::info!("=== Initializing hal.fun model downloader ===");

    if let Some(server) = host.instance() {
        tracing::info!("Found server instance, adding routes");
        register(ctx, &server);
        return Registration::Immediate;
    }

    tracing::info!("Host not ready, deferring registration");
    let ctx = ctx.clone();
    let signal = host.subscribe();

    Registration::Deferred(tokio::spawn(async move {
        match signal.ready().await {
            Some(server) => {
                register(&ctx, &server);
                true
            }
            None => {
                tracing::warn!("Host went away before becoming ready, routes not registered");
                false
            }
        }
    }))
}

fn register(ctx: &AppContext, host_server: &HostServer) {
    host_server.add_routes(server::create_router(ctx.clone()));
    host_server.register_node(Arc::new(ModelDownloaderNode::new(ctx.clone())));
    host_server.register_node(Arc::new(EnabledModelsDownloaderNode::new(ctx.clone())));
    tracing::info!("Routes registered successfully");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::test_context;
    use crate::model::downloader::tests::FakeHub;

    fn node_names(server: &HostServer) -> Vec<String> {
        server.node_info().into_iter().map(|n| n.name).collect()
    }

    #[tokio::test]
    async fn test_ready_host_registers_immediately() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path(), Arc::new(FakeHub::default()));
        let host = HostHandle::new();
        let server = Arc::new(HostServer::new());
        host.mark_ready(server.clone());

        assert!(matches!(install(&ctx, &host), Registration::Immediate));
        assert_eq!(
            node_names(&server),
            vec!["EnabledModelsDownloader", "ModelDownloader"]
        );
    }

    #[tokio::test]
    async fn test_registration_waits_for_host() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path(), Arc::new(FakeHub::default()));
        let host = HostHandle::new();

        let Registration::Deferred(pending) = install(&ctx, &host) else {
            panic!("expected deferred registration");
        };

        let server = Arc::new(HostServer::new());
        assert!(node_names(&server).is_empty());
        host.mark_ready(server.clone());

        assert!(pending.await.unwrap());
        assert_eq!(node_names(&server).len(), 2);
    }

    #[tokio::test]
    async fn test_host_dropped_before_ready() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = test_context(tmp.path(), Arc::new(FakeHub::default()));
        let host = HostHandle::new();

        let Registration::Deferred(pending) = install(&ctx, &host) else {
            panic!("expected deferred registration");
        };
        drop(host);

        assert!(!pending.await.unwrap());
    }
}
