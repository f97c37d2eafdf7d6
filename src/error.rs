use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("Model config file not found at {}", .0.display())]
	CatalogNotFound(PathBuf),
	#[error("No matching models found for {0}")]
	ModelNotFound(String),
	#[error("{0}")]
	InvalidInput(String),
	#[error("Download failed: {0}")]
	DownloadFailed(String),
	#[error("Configuration error: {0}")]
	ConfigError(String),
	#[error("Unknown node type: {0}")]
	NodeNotFound(String),
	#[error("Task failed: {0}")]
	TaskFailed(String),
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	SerializationError(String),
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::SerializationError(err.to_string())
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(err: tokio::task::JoinError) -> Self {
		Error::TaskFailed(err.to_string())
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			Error::InvalidInput(msg) => (
				StatusCode::BAD_REQUEST,
				serde_json::json!({ "status": format!("Error: {}", msg) }),
			),
			Error::ModelNotFound(_) => (
				StatusCode::NOT_FOUND,
				serde_json::json!({ "status": self.to_string() }),
			),
			_ => (
				StatusCode::INTERNAL_SERVER_ERROR,
				serde_json::json!({ "error": self.to_string() }),
			),
		};

		(status, Json(body)).into_response()
	}
}

pub type Result<T> = std::result::Result<T, Error>;
