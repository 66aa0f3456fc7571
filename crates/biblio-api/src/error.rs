//! Error-to-status mapping for the HTTP surface.

use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// A discovery-core error carried to the HTTP layer.
///
/// The mapping is by failure class: access problems are the caller's
/// fault (403), unknown documents are 404, backend failures are gateway
/// errors, everything else is a server error.
#[derive(Debug)]
pub struct ApiError(biblio_core::Error);

impl From<biblio_core::Error> for ApiError {
    fn from(e: biblio_core::Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        use biblio_core::Error;
        match &self.0 {
            Error::Access { .. } => StatusCode::FORBIDDEN,
            Error::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Serialization(_) => StatusCode::BAD_REQUEST,
            Error::Search { .. } | Error::Storage { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        use biblio_core::Error;
        match &self.0 {
            Error::Access { .. } => "access",
            Error::DocumentNotFound { .. } => "not_found",
            Error::Serialization(_) => "serialization",
            Error::Search { .. } => "search",
            Error::Storage { .. } => "storage",
            Error::Config { .. } => "config",
            _ => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        } else {
            log::debug!("Request rejected: {}", self.0);
        }

        let body = serde_json::json!({
            "error": {
                "category": self.category(),
                "message": self.0.to_string(),
            }
        });
        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            serde_json::to_string(&body).unwrap_or_default(),
        )
            .into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
