//! Relay error types with HTTP status code mapping.
//!
//! [`DispatchError`] is the central error type for the relay. Errors raised
//! at the command boundary (bad index, missing roster) are returned to the
//! immediate caller. Errors raised at the network boundary (delivery,
//! decoding) are logged where they happen and never escape past the
//! broadcast registry. Each variant also maps to an HTTP status code and a
//! structured JSON error response for the REST surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::{CameraId, ConnectionId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "value 7 is out of range for Select camera (option count is 3)",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error enum shared by the command layer, the codec and the registry.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 / 502                    |
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// `execute` was called with an index outside `0..option_count`.
    #[error("value {value} is out of range for {command} (option count is {count})")]
    InvalidCommandValue {
        /// Name of the command that rejected the value.
        command: &'static str,
        /// The rejected value.
        value: i32,
        /// Number of options the command had when the value was checked.
        count: usize,
    },

    /// A push-channel message could not be decoded into an envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A message could not be handed to one peer.
    #[error("delivery to connection {connection_id} failed: {reason}")]
    BroadcastDeliveryFailure {
        /// Connection that could not be reached.
        connection_id: ConnectionId,
        /// Why the send failed.
        reason: String,
    },

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A roster was replaced with nothing.
    #[error("a controller context requires a camera roster")]
    NullRosterAssignment,

    /// A camera was selected that is not part of the context roster.
    #[error("camera {0} is not part of the roster")]
    CameraNotInRoster(CameraId),

    /// No command exists at the requested position.
    #[error("command not found: {0}")]
    CommandNotFound(usize),

    /// No camera exists at the requested roster position.
    #[error("camera not found at roster index {0}")]
    CameraNotFound(usize),

    /// The camera transport refused or failed to deliver a control.
    #[error("camera transport error: {0}")]
    Transport(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidCommandValue { .. } => 1001,
            Self::MalformedEnvelope(_) => 1002,
            Self::NullRosterAssignment => 1003,
            Self::InvalidRequest(_) => 1004,
            Self::CommandNotFound(_) => 2001,
            Self::CameraNotFound(_) => 2002,
            Self::CameraNotInRoster(_) => 2003,
            Self::Internal(_) => 3000,
            Self::BroadcastDeliveryFailure { .. } => 3001,
            Self::Transport(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCommandValue { .. }
            | Self::MalformedEnvelope(_)
            | Self::NullRosterAssignment
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::CommandNotFound(_) | Self::CameraNotFound(_) => StatusCode::NOT_FOUND,
            Self::CameraNotInRoster(_) => StatusCode::CONFLICT,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::BroadcastDeliveryFailure { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_message_reports_value_and_count() {
        let err = DispatchError::InvalidCommandValue {
            command: "Select camera",
            value: 7,
            count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("option count is 3"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(
            DispatchError::CommandNotFound(42).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DispatchError::CameraNotFound(3).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn error_codes_are_distinct() {
        let codes = [
            DispatchError::InvalidCommandValue {
                command: "Pan",
                value: -1,
                count: 0,
            }
            .error_code(),
            DispatchError::MalformedEnvelope(String::new()).error_code(),
            DispatchError::NullRosterAssignment.error_code(),
            DispatchError::InvalidRequest(String::new()).error_code(),
            DispatchError::CommandNotFound(0).error_code(),
            DispatchError::CameraNotFound(0).error_code(),
            DispatchError::CameraNotInRoster(CameraId::new()).error_code(),
            DispatchError::Transport(String::new()).error_code(),
            DispatchError::Internal(String::new()).error_code(),
        ];
        let unique: std::collections::HashSet<u32> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn into_response_sets_status() {
        let response = DispatchError::NullRosterAssignment.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
