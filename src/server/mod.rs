use crate::context::AppContext;
use crate::error::{Error, Result};
use axum::{
	body::Bytes,
	extract::{OriginalUri, State},
	routing::{get, post},
	Json, Router,
};
use serde::Serialize;
use serde_json::Value;

pub const ROUTE_PREFIX: &str = "/hal-fun-downloader";

#[derive(Serialize)]
pub struct StatusResponse {
	pub status: String,
}

// The panel posts stringified JSON without a content type, so bodies are parsed by hand.
fn parse_body(body: &Bytes) -> Result<Value> {
	Ok(serde_json::from_slice(body)?)
}

async fn config_handler(State(ctx): State<AppContext>, OriginalUri(uri): OriginalUri) -> Result<Json<Value>> {
	tracing::info!("Config endpoint called: {}", uri.path());

	let catalog = ctx.catalog().load().inspect_err(|e| {
		tracing::error!("Error in config endpoint: {}", e);
	})?;

	Ok(Json(serde_json::to_value(catalog)?))
}

async fn get_active_handler(State(ctx): State<AppContext>, OriginalUri(uri): OriginalUri) -> Result<Json<Value>> {
	tracing::info!("Active config endpoint called: {}", uri.path());

	let active = ctx.active_with_status().inspect_err(|e| {
		tracing::error!("Error in active config endpoint: {}", e);
	})?;

	Ok(Json(active))
}

async fn update_active_handler(
	State(ctx): State<AppContext>,
	OriginalUri(uri): OriginalUri,
	body: Bytes,
) -> Result<Json<StatusResponse>> {
	tracing::info!("Update active config endpoint called: {}", uri.path());

	parse_body(&body)
		.and_then(|document| ctx.active().replace(document))
		.inspect_err(|e| tracing::error!("Error in update active config: {}", e))?;

	Ok(Json(StatusResponse {
		status: "success".to_string(),
	}))
}

async fn download_handler(
	State(ctx): State<AppContext>,
	OriginalUri(uri): OriginalUri,
	body: Bytes,
) -> Result<Json<StatusResponse>> {
	tracing::info!("Download endpoint called: {}", uri.path());

	let request = parse_body(&body).inspect_err(|e| tracing::error!("Error in download endpoint: {}", e))?;
	let model_name = request
		.get("model_name")
		.and_then(Value::as_str)
		.filter(|name| !name.is_empty())
		.ok_or_else(|| Error::InvalidInput("No model name provided".to_string()))?;

	let descriptor = ctx.catalog().find_first(model_name).inspect_err(|e| {
		if !matches!(e, Error::ModelNotFound(_)) {
			tracing::error!("Error in download endpoint: {}", e);
		}
	})?;

	let status = ctx.download(descriptor).await?;

	Ok(Json(StatusResponse { status }))
}

/// The plugin's routes, relative to the host root.
pub fn create_router(ctx: AppContext) -> Router {
	Router::new()
		.route(&format!("{}/config", ROUTE_PREFIX), get(config_handler))
		.route(
			&format!("{}/active", ROUTE_PREFIX),
			get(get_active_handler).post(update_active_handler),
		)
		.route(&format!("{}/download", ROUTE_PREFIX), post(download_handler))
		.with_state(ctx)
}
