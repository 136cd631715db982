//! On-demand function adapter.
//!
//! One event in, one response out, with configuration loaded per invocation.
//! The operation is picked from the body's fields rather than from a route.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    config::AppConfig,
    error::ServiceError,
    pipeline::{GenerationResult, select},
    server::parse_request,
    service::CodegenService,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn ok(result: &GenerationResult) -> Self {
        Self::json(200, serde_json::to_string(result))
    }

    fn from_error(err: &ServiceError) -> Self {
        Self::json(err.status().as_u16(), serde_json::to_string(&err.body()))
    }

    fn json(status_code: u16, body: serde_json::Result<String>) -> Self {
        let (status_code, body) = match body {
            Ok(body) => (status_code, body),
            Err(e) => {
                error!(error = %e, "failed to encode response body");
                (500, r#"{"error":"Internal Server Error"}"#.to_string())
            }
        };
        let headers = BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        Self {
            status_code,
            headers,
            body,
        }
    }
}

/// Decodes a raw event and handles it. An event that does not decode is
/// answered with a 400 like any other bad request.
pub async fn handle_raw_event<F>(raw: &str, lookup: F) -> FunctionResponse
where
    F: Fn(&str) -> Option<String>,
{
    match serde_json::from_str::<FunctionEvent>(raw) {
        Ok(event) => handle_event(event, lookup).await,
        Err(e) => {
            let err = ServiceError::InvalidRequest(format!("invalid function event: {e}"));
            warn!(error = %err, "rejected invocation");
            FunctionResponse::from_error(&err)
        }
    }
}

/// Handles one invocation, reading configuration through `lookup`. A missing
/// credential fails only this invocation.
pub async fn handle_event<F>(event: FunctionEvent, lookup: F) -> FunctionResponse
where
    F: Fn(&str) -> Option<String>,
{
    if !is_post(&event) {
        return FunctionResponse::from_error(&ServiceError::MethodNotAllowed);
    }

    let service = AppConfig::from_lookup(lookup)
        .and_then(|config| CodegenService::from_config(Arc::new(config)));
    match service {
        Ok(service) => respond(event, &service).await,
        Err(err) => {
            error!(error = %err, "function invocation not configured");
            FunctionResponse::from_error(&err)
        }
    }
}

/// Handles one invocation against an already wired service.
pub async fn respond(event: FunctionEvent, service: &CodegenService) -> FunctionResponse {
    if !is_post(&event) {
        return FunctionResponse::from_error(&ServiceError::MethodNotAllowed);
    }

    let body = event.body.unwrap_or_default();
    let selected = match parse_request(body.as_bytes()).and_then(select) {
        Ok(selected) => selected,
        Err(err) => {
            warn!(error = %err, "rejected invocation");
            return FunctionResponse::from_error(&err);
        }
    };

    match service.execute(selected).await {
        Ok(result) => FunctionResponse::ok(&result),
        Err(err) => FunctionResponse::from_error(&err),
    }
}

fn is_post(event: &FunctionEvent) -> bool {
    event.http_method.eq_ignore_ascii_case("POST")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(method: &str, body: Option<&str>) -> FunctionEvent {
        FunctionEvent {
            http_method: method.to_string(),
            body: body.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn non_post_is_rejected_before_configuration() {
        let response = handle_event(event("GET", None), |_| None).await;
        assert_eq!(response.status_code, 405);
        assert_eq!(response.body, r#"{"error":"Method Not Allowed"}"#);
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_invocation() {
        let response = handle_event(event("POST", Some(r#"{"prompt":"a form"}"#)), |_| None).await;
        assert_eq!(response.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], "Internal Server Error");
        assert!(
            body["details"]
                .as_str()
                .unwrap()
                .contains("WATSONX_API_KEY")
        );
    }

    #[tokio::test]
    async fn event_without_method_is_a_bad_request() {
        let raw = r#"{"body":"{\"prompt\":\"a form\"}"}"#;
        let response = handle_raw_event(raw, |_| None).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.headers["Content-Type"], "application/json");
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("invalid function event")
        );
    }

    #[tokio::test]
    async fn raw_event_reaches_method_check() {
        let response = handle_raw_event(r#"{"httpMethod":"PUT"}"#, |_| None).await;
        assert_eq!(response.status_code, 405);
    }

    #[test]
    fn event_uses_camel_case_fields() {
        let event: FunctionEvent =
            serde_json::from_str(r#"{"httpMethod":"post","body":"{}"}"#).unwrap();
        assert!(is_post(&event));
        assert_eq!(event.body.as_deref(), Some("{}"));
    }

    #[test]
    fn responses_are_json() {
        let response = FunctionResponse::ok(&GenerationResult {
            code: "<Button/>".into(),
            model: "m".into(),
        });
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.body, r#"{"code":"<Button/>","model":"m"}"#);
    }
}
