use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::Operation;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unsupported framework: {0}")]
    UnsupportedFramework(String),
    #[error("failed to {operation} code: {details}")]
    Gateway {
        operation: Operation,
        details: String,
    },
    #[error("no code generated")]
    EmptyGeneration,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("method not allowed")]
    MethodNotAllowed,
}

/// JSON body returned for every failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) | ServiceError::UnsupportedFramework(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::Gateway { .. }
            | ServiceError::EmptyGeneration
            | ServiceError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ServiceError::InvalidRequest(message) => ErrorBody {
                error: message.clone(),
                details: None,
            },
            ServiceError::UnsupportedFramework(framework) => ErrorBody {
                error: "Unsupported framework".into(),
                details: Some(format!(
                    "'{framework}' is not supported; use 'react' or 'web-components'"
                )),
            },
            ServiceError::Gateway { operation, details } => ErrorBody {
                error: format!("Failed to {operation} code"),
                details: Some(details.clone()),
            },
            ServiceError::EmptyGeneration => ErrorBody {
                error: "No code generated".into(),
                details: Some("The API returned an empty response".into()),
            },
            // Credential names are fine to surface, values never reach this message.
            ServiceError::Configuration(message) => ErrorBody {
                error: "Internal Server Error".into(),
                details: Some(message.clone()),
            },
            ServiceError::MethodNotAllowed => ErrorBody {
                error: "Method Not Allowed".into(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), axum::Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_bad_request() {
        assert_eq!(
            ServiceError::InvalidRequest("Prompt is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::UnsupportedFramework("vue".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn gateway_and_empty_generation_are_distinguishable() {
        let gateway = ServiceError::Gateway {
            operation: Operation::Convert,
            details: "connection refused".into(),
        };
        assert_eq!(gateway.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(gateway.body().error, "Failed to convert code");
        assert_eq!(gateway.body().details.as_deref(), Some("connection refused"));

        let empty = ServiceError::EmptyGeneration;
        assert_eq!(empty.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(empty.body().error, "No code generated");
    }

    #[test]
    fn method_not_allowed_body_omits_details() {
        let body = serde_json::to_value(ServiceError::MethodNotAllowed.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Method Not Allowed" }));
    }
}
