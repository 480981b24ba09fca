use crate::downloader::ExportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures a request handler can hit
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("failed to export table: {0}")]
    Export(#[from] ExportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        let message = match self {
            AppError::Render(_) => "Failed to render page",
            AppError::Export(_) => "Failed to export table",
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
