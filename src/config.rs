use std::{
    env, fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use crate::error::ServiceError;

pub const DEFAULT_ENDPOINT: &str = "https://us-south.ml.cloud.ibm.com";
pub const DEFAULT_API_VERSION: &str = "2024-05-31";
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-3-3-70b-instruct";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const REQUIRED_VARS: [&str; 2] = ["WATSONX_API_KEY", "WATSONX_PROJECT_ID"];

/// Credential wrapper whose Debug output never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub api_key: ApiKey,
    pub project_id: String,
    pub endpoint: String,
    pub api_version: String,
    pub model_id: String,
    pub iam_url: String,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub gateway_timeout: Duration,
    pub strip_preamble: bool,
    pub mapping_table_path: Option<PathBuf>,
    pub verify_on_startup: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. The function adapter calls this
    /// on every invocation; the server calls it once through `from_env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::Configuration(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let listen_addr = get("SERVER_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3001".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3001));

        let api_key = ApiKey::new(get("WATSONX_API_KEY").unwrap_or_default());
        let project_id = get("WATSONX_PROJECT_ID").unwrap_or_default();
        let endpoint = get("WATSONX_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let api_version =
            get("WATSONX_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let model_id = get("WATSONX_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let iam_url = get("WATSONX_IAM_URL").unwrap_or_else(|| DEFAULT_IAM_URL.to_string());

        let max_new_tokens = get("MAX_NEW_TOKENS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(2048);
        let temperature = get("TEMPERATURE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.7);
        let top_p = get("TOP_P").and_then(|v| v.parse().ok()).unwrap_or(0.9);
        let gateway_timeout = get("GATEWAY_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let strip_preamble = get("STRIP_CODE_PREAMBLE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let mapping_table_path = get("MAPPING_TABLE_PATH").map(PathBuf::from);
        let verify_on_startup = get("VERIFY_CREDENTIALS_ON_STARTUP")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            listen_addr,
            api_key,
            project_id,
            endpoint,
            api_version,
            model_id,
            iam_url,
            max_new_tokens,
            temperature,
            top_p,
            gateway_timeout,
            strip_preamble,
            mapping_table_path,
            verify_on_startup,
        })
    }

    /// Text generation URL including the API version query.
    pub fn generation_url(&self) -> String {
        format!(
            "{}/ml/v1/text/generation?version={}",
            self.endpoint, self.api_version
        )
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_credentials_are_reported_together() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        match err {
            ServiceError::Configuration(message) => {
                assert!(message.contains("WATSONX_API_KEY"));
                assert!(message.contains("WATSONX_PROJECT_ID"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            ("WATSONX_API_KEY", "  "),
            ("WATSONX_PROJECT_ID", "proj"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(ref m) if m.contains("WATSONX_API_KEY")));
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = AppConfig::from_lookup(lookup(&[
            ("WATSONX_API_KEY", "secret"),
            ("WATSONX_PROJECT_ID", "proj"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr.port(), 3001);
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.max_new_tokens, 2048);
        assert_eq!(config.gateway_timeout, Duration::from_secs(60));
        assert!(!config.strip_preamble);
        assert!(config.verify_on_startup);
        assert_eq!(
            config.generation_url(),
            "https://us-south.ml.cloud.ibm.com/ml/v1/text/generation?version=2024-05-31"
        );
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let config = AppConfig::from_lookup(lookup(&[
            ("WATSONX_API_KEY", "secret"),
            ("WATSONX_PROJECT_ID", "proj"),
            ("WATSONX_ENDPOINT", "https://eu-de.ml.cloud.ibm.com/"),
            ("MAX_NEW_TOKENS", "not-a-number"),
            ("TEMPERATURE", "0.2"),
            ("STRIP_CODE_PREAMBLE", "TRUE"),
            ("VERIFY_CREDENTIALS_ON_STARTUP", "0"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "https://eu-de.ml.cloud.ibm.com");
        assert_eq!(config.max_new_tokens, 2048);
        assert_eq!(config.temperature, 0.2);
        assert!(config.strip_preamble);
        assert!(!config.verify_on_startup);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AppConfig::from_lookup(lookup(&[
            ("WATSONX_API_KEY", "super-secret-key"),
            ("WATSONX_PROJECT_ID", "proj"),
        ]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
