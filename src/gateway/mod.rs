mod types;
mod watsonx;

use async_trait::async_trait;
use thiserror::Error;

pub use types::{
    DecodingMethod, GenerationCandidate, GenerationParameters, ModelRequest, ModelResponse,
};
pub use watsonx::WatsonxGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request to model endpoint failed: {0}")]
    Transport(String),
    #[error("model endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("unreadable model response: {0}")]
    Decode(String),
}

/// Sends one prompt to a hosted text-generation model. One attempt per call,
/// no retries.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn generate_text(&self, request: &ModelRequest) -> Result<ModelResponse, GatewayError>;
}
