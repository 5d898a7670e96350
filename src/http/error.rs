//! HTTP error mapping.
//!
//! Every failure leaves the gateway as `{"error": ..., "details"?: ...}`.
//! Client-correctable failures are 4xx; registry, fee and broadcast
//! failures are 5xx.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::naming::ResolutionError;
use crate::transfer::TransferError;

/// Wire body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a failed lookup of a `subject` ("ENS name", "Base name", ...).
    pub fn from_resolution(subject: &str, error: ResolutionError) -> Self {
        match error {
            ResolutionError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, format!("{} not found", subject))
            }
            ResolutionError::UnsupportedScheme(name) => {
                Self::bad_request("Unsupported name").with_details(name)
            }
            ResolutionError::RegistryUnavailable(details) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to resolve {}", subject),
            )
            .with_details(details),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(error: TransferError) -> Self {
        match error {
            TransferError::InvalidRequest(msg) => Self::bad_request(msg),
            TransferError::Resolution(e) => Self::from_resolution("Recipient name", e),
            TransferError::InvalidRecipient(details) => {
                Self::bad_request("Invalid recipient address").with_details(details)
            }
            TransferError::Disabled(details) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "Transfers are disabled")
                    .with_details(details)
            }
            e @ (TransferError::FeeUnavailable(_)
            | TransferError::TokenMetadataUnavailable(_)
            | TransferError::Submission(_)) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send transaction")
                    .with_details(e.to_string())
            }
        }
    }
}

/// Syntax errors, wrong field types and a missing JSON content type are all
/// client-correctable, so every body rejection is a 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = %self.body.error,
                details = ?self.body.details,
                "Request failed"
            );
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_statuses() {
        let e = ApiError::from_resolution("ENS name", ResolutionError::NotFound("x.eth".into()));
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
        assert_eq!(e.body.error, "ENS name not found");

        let e = ApiError::from_resolution(
            "Base name",
            ResolutionError::RegistryUnavailable("timeout".into()),
        );
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.body.details.as_deref(), Some("timeout"));

        let e = ApiError::from_resolution("ENS name", ResolutionError::UnsupportedScheme("a.sol".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_transfer_statuses() {
        let e = ApiError::from(TransferError::Submission("nonce too low".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.body.error, "Failed to send transaction");
        assert_eq!(e.body.details.as_deref(), Some("nonce too low"));

        let e = ApiError::from(TransferError::InvalidRequest("Recipient and amount are required".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert!(e.body.details.is_none());

        let e = ApiError::from(TransferError::InvalidRecipient("zero".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_body_rejections_are_bad_requests() {
        use axum::extract::rejection::MissingJsonContentType;

        let e = ApiError::from(JsonRejection::from(MissingJsonContentType::default()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.body.error, "Invalid request body");
        assert!(e.body.details.is_some());
    }
}
