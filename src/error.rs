// Request-scoped failures of the retrieve-and-render pipeline

use crate::models::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Form input the pipeline cannot act on (bad date, unsupported subtype).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Login was rejected, or its response lacked the token or account id.
    #[error("authorization failed: {status_text}")]
    Auth { status: u16, status_text: String },

    /// Data endpoint answered with a non-200 status.
    #[error("data request failed: {status_text}")]
    Fetch { status: u16, status_text: String },

    /// Connection, TLS, timeout or body read failure talking to Tidepool.
    #[error("data service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body parsed neither as the measurement array nor as an error object.
    #[error("unexpected response from the data service: {0}")]
    MalformedPayload(String),

    /// Tidepool sent its own error object.
    #[error("data service reported an error: {0}")]
    ServiceReported(ServiceError),

    #[error("report rendering failed: {0}")]
    Render(String),
}

impl ReportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ReportError::Auth { .. } => StatusCode::UNAUTHORIZED,
            ReportError::Fetch { .. } | ReportError::MalformedPayload(_) => {
                StatusCode::BAD_GATEWAY
            }
            ReportError::Transport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ReportError::Transport(_) => StatusCode::BAD_GATEWAY,
            ReportError::ServiceReported(se) => StatusCode::from_u16(se.status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ReportError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short heading for the failure page.
    pub fn title(&self) -> &'static str {
        match self {
            ReportError::InvalidInput(_) => "Please check the form",
            ReportError::Auth { .. } => "Tidepool login failed",
            ReportError::Fetch { .. } => "Tidepool data request failed",
            ReportError::Transport(_) => "Tidepool could not be reached",
            ReportError::MalformedPayload(_) => "Unexpected response from Tidepool",
            ReportError::ServiceReported(_) => "Tidepool reported an error",
            ReportError::Render(_) => "Report could not be generated",
        }
    }
}

/// Status text in the `"403 Forbidden"` form Tidepool users see in browsers.
pub(crate) fn status_text(status: reqwest::StatusCode) -> String {
    status.to_string()
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ReportError::Render(_) => tracing::error!(error = %self, "report request failed"),
            ReportError::MalformedPayload(_) => {
                tracing::error!(error = %self, "report request failed")
            }
            _ => tracing::warn!(error = %self, status = %status, "report request failed"),
        }
        let page = crate::routes::pages::error_page(&self);
        (status, axum::response::Html(page)).into_response()
    }
}
