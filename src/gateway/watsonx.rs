use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    config::{ApiKey, AppConfig},
    error::ServiceError,
    gateway::{GatewayError, ModelGateway, ModelRequest, ModelResponse},
};

const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// watsonx.ai text generation over REST, authenticated with an IBM Cloud
/// IAM token exchanged from the API key.
pub struct WatsonxGateway {
    http: reqwest::Client,
    api_key: ApiKey,
    iam_url: String,
    generation_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl WatsonxGateway {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.gateway_timeout)
            .build()
            .map_err(|e| ServiceError::Configuration(format!("cannot build http client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            iam_url: config.iam_url.clone(),
            generation_url: config.generation_url(),
            token: Mutex::new(None),
        })
    }

    /// Exchanges the API key once so bad credentials surface before serving.
    pub async fn verify_credentials(&self) -> Result<(), GatewayError> {
        self.access_token().await.map(|_| ())
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|t| Instant::now() < t.refresh_at)
            .map(|t| t.value.clone());
        if let Some(value) = cached {
            return Ok(value);
        }

        debug!("requesting IAM access token");
        let response = self
            .http
            .post(&self.iam_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", IAM_GRANT_TYPE),
                ("apikey", self.api_key.expose()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(%status, "IAM token exchange rejected");
            return Err(GatewayError::Auth(format!("{status}: {body}")));
        }

        let token: IamTokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("invalid token response: {e}")))?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        let refresh_at = Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN);
        self.token.lock().replace(CachedToken {
            value: token.access_token.clone(),
            refresh_at,
        });

        Ok(token.access_token)
    }
}

#[async_trait]
impl ModelGateway for WatsonxGateway {
    async fn generate_text(&self, request: &ModelRequest) -> Result<ModelResponse, GatewayError> {
        let token = self.access_token().await?;

        debug!(
            model_id = %request.model_id,
            input_len = request.input.len(),
            "calling text generation"
        );
        let response = self
            .http
            .post(&self.generation_url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ModelResponse>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "WATSONX_API_KEY" => Some("key".into()),
            "WATSONX_PROJECT_ID" => Some("proj".into()),
            "WATSONX_ENDPOINT" => Some("https://eu-de.ml.cloud.ibm.com".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn targets_versioned_generation_url() {
        let gateway = WatsonxGateway::new(&config()).unwrap();
        assert_eq!(
            gateway.generation_url,
            "https://eu-de.ml.cloud.ibm.com/ml/v1/text/generation?version=2024-05-31"
        );
        assert!(gateway.token.lock().is_none());
    }

    #[tokio::test]
    async fn cached_token_is_reused_until_refresh() {
        let gateway = WatsonxGateway::new(&config()).unwrap();
        gateway.token.lock().replace(CachedToken {
            value: "cached".into(),
            refresh_at: Instant::now() + Duration::from_secs(300),
        });
        assert_eq!(gateway.access_token().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn unreachable_iam_endpoint_is_an_auth_error() {
        let config = AppConfig {
            iam_url: "http://127.0.0.1:9/identity/token".into(),
            gateway_timeout: Duration::from_secs(2),
            ..config()
        };
        let gateway = WatsonxGateway::new(&config).unwrap();
        let err = gateway.verify_credentials().await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth(_)));
    }
}
