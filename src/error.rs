//! Error types for the MISP IOC service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IocError>;

#[derive(Error, Debug)]
pub enum IocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to retrieve IOCs: {0}")]
    Retrieval(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IocError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IocError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IocError::Retrieval(_) => StatusCode::BAD_GATEWAY,
            IocError::Http(_) => StatusCode::BAD_GATEWAY,
            IocError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IocError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IocError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = self.to_string();

        tracing::error!("Request failed: {}", message);

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
