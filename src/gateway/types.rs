use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, pipeline::Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodingMethod {
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub decoding_method: DecodingMethod,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl GenerationParameters {
    /// Defaults per operation. Convert runs with light penalties for steadier
    /// output.
    pub fn for_operation(operation: Operation, config: &AppConfig) -> Self {
        let penalty = match operation {
            Operation::Convert => 0.1,
            Operation::Generate | Operation::Refine => 0.0,
        };
        Self {
            decoding_method: DecodingMethod::Sample,
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            frequency_penalty: penalty,
            presence_penalty: penalty,
        }
    }
}

/// Body of one text generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub input: String,
    pub model_id: String,
    pub project_id: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelResponse {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub results: Vec<GenerationCandidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationCandidate {
    #[serde(default)]
    pub generated_text: Option<String>,
    #[serde(default)]
    pub generated_token_count: Option<u32>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl ModelResponse {
    /// Text of the first candidate, if it has any non-blank content.
    pub fn first_generated_text(&self) -> Option<&str> {
        self.results
            .first()
            .and_then(|c| c.generated_text.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "WATSONX_API_KEY" => Some("key".into()),
            "WATSONX_PROJECT_ID" => Some("proj".into()),
            "MAX_NEW_TOKENS" => Some("1000".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn convert_uses_penalties_and_others_do_not() {
        let config = config();
        let convert = GenerationParameters::for_operation(Operation::Convert, &config);
        assert_eq!(convert.frequency_penalty, 0.1);
        assert_eq!(convert.presence_penalty, 0.1);
        assert_eq!(convert.max_new_tokens, 1000);

        let generate = GenerationParameters::for_operation(Operation::Generate, &config);
        assert_eq!(generate.frequency_penalty, 0.0);
        assert_eq!(generate.temperature, 0.7);
        assert_eq!(generate.top_p, 0.9);
    }

    #[test]
    fn request_serializes_in_wire_shape() {
        let config = config();
        let request = ModelRequest {
            input: "hello".into(),
            model_id: "m".into(),
            project_id: "p".into(),
            parameters: GenerationParameters::for_operation(Operation::Refine, &config),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model_id"], "m");
        assert_eq!(value["project_id"], "p");
        assert_eq!(value["parameters"]["decoding_method"], "sample");
        assert_eq!(value["parameters"]["max_new_tokens"], 1000);
    }

    #[test]
    fn blank_or_missing_text_is_not_generated_text() {
        let missing: ModelResponse = serde_json::from_str(r#"{"results":[{}]}"#).unwrap();
        assert_eq!(missing.first_generated_text(), None);

        let blank: ModelResponse =
            serde_json::from_str(r#"{"results":[{"generated_text":"  \n"}]}"#).unwrap();
        assert_eq!(blank.first_generated_text(), None);

        let none: ModelResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(none.first_generated_text(), None);

        let ok: ModelResponse = serde_json::from_str(
            r#"{"model_id":"m","results":[{"generated_text":"<Button/>","stop_reason":"eos_token"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.first_generated_text(), Some("<Button/>"));
    }
}
