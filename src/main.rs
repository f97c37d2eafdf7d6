mod cli;
mod config;
mod context;
mod error;
mod host;
mod model;
mod nodes;
mod plugin;
mod runtime;
mod server;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use context::AppContext;
use host::{HostHandle, HostServer, NodeInputs};
use model::HfHubClient;
use nodes::{EnabledModelsDownloaderNode, ModelDownloaderNode, ACTION_CHECK, ACTION_DOWNLOAD};
use plugin::Registration;
use runtime::TaskPool;
use std::sync::Arc;

async fn serve(ctx: AppContext, host: &str, port: u16) -> anyhow::Result<()> {
    let handle = HostHandle::new();

    // The plugin loads before the server exists, as it would inside a real host.
    let registration = plugin::install(&ctx, &handle);

    let server = Arc::new(HostServer::new());
    handle.mark_ready(server.clone());
    if let Registration::Deferred(pending) = registration {
        pending.await.context("plugin registration task failed")?;
    }

    let app = server.router();
    let addr = format!("{}:{}", host, port);

    println!("🚀 hal.fun downloader starting...");
    println!("   Catalog: {:?}", ctx.config().catalog_path);
    println!("   Models: {:?}", ctx.config().models_dir);
    println!("   Listening on: http://{}", addr);
    println!("   Config: http://{}/api/hal-fun-downloader/config", addr);
    println!("   Active: http://{}/api/hal-fun-downloader/active", addr);
    println!("   Nodes: http://{}/object_info", addr);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Attaches the plugin to a ready host and runs one node off the async executor.
async fn run_node(ctx: AppContext, node: &'static str, inputs: NodeInputs) -> anyhow::Result<()> {
    let handle = HostHandle::new();
    let server = Arc::new(HostServer::new());
    handle.mark_ready(server.clone());
    plugin::install(&ctx, &handle);

    let output = tokio::task::spawn_blocking(move || server.execute_node(node, &inputs))
        .await
        .context("node execution panicked")??;

    for value in output {
        match value.as_str() {
            Some(status) => println!("{}", status),
            None => println!("{}", value),
        }
    }

    Ok(())
}

fn node_inputs(action: &str, model_name: String) -> NodeInputs {
    let mut inputs = NodeInputs::new();
    inputs.insert("action".to_string(), action.into());
    inputs.insert("model_name".to_string(), model_name.into());
    inputs
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let client = Arc::new(HfHubClient::new(config.hf_token.clone()));
    let ctx = AppContext::new(config, client, TaskPool::current()?)?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(ctx, &host, port).await?;
        }

        Commands::List => {
            let catalog = ctx.catalog();
            let descriptors = catalog.load()?;

            if descriptors.is_empty() {
                println!("No models in {:?}.", catalog.path());
            } else {
                let enabled = ctx.active().enabled_models();
                println!("Catalog models:\n");
                for descriptor in descriptors {
                    let path = descriptor.resolve_path(catalog.models_dir());
                    let mark = if path.exists() { "✓" } else { "✗" };
                    println!("  {} {}", mark, descriptor.basename());
                    println!("    Repository: {}", descriptor.repo_id);
                    println!("    Remote: {}", model::hub::remote_path(&descriptor.subfolder, &descriptor.filename));
                    println!("    Path: {:?}", path);
                    if enabled.iter().any(|name| name == descriptor.basename()) {
                        println!("    Enabled");
                    }
                    println!();
                }
            }
        }

        Commands::Check { model_name } => {
            run_node(ctx, ModelDownloaderNode::NAME, node_inputs(ACTION_CHECK, model_name)).await?;
        }

        Commands::Download { model_name } => {
            run_node(ctx, ModelDownloaderNode::NAME, node_inputs(ACTION_DOWNLOAD, model_name)).await?;
        }

        Commands::DownloadEnabled => {
            run_node(ctx, EnabledModelsDownloaderNode::NAME, NodeInputs::new()).await?;
        }
    }

    Ok(())
}
