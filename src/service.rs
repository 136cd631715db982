use std::sync::Arc;

use tracing::{error, info};

use crate::{
    config::AppConfig,
    error::ServiceError,
    gateway::{GenerationParameters, ModelGateway, ModelRequest, WatsonxGateway},
    pipeline::{
        GenerationResult, MappingTable, Operation, SanitizeOptions, SelectedRequest, build_prompt,
        sanitize,
    },
};

/// Runs one validated request through prompt building, the model gateway and
/// sanitization. Holds only read-only state, so one instance serves every
/// request concurrently.
pub struct CodegenService {
    config: Arc<AppConfig>,
    gateway: Arc<dyn ModelGateway>,
    mappings: Arc<MappingTable>,
}

impl CodegenService {
    pub fn new(
        config: Arc<AppConfig>,
        gateway: Arc<dyn ModelGateway>,
        mappings: Arc<MappingTable>,
    ) -> Self {
        Self {
            config,
            gateway,
            mappings,
        }
    }

    /// Wires the watsonx gateway and the configured mapping table.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, ServiceError> {
        let gateway = Arc::new(WatsonxGateway::new(&config)?);
        let mappings = Arc::new(MappingTable::load(config.mapping_table_path.as_deref())?);
        Ok(Self::new(config, gateway, mappings))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    pub fn build_model_request(&self, selected: &SelectedRequest) -> ModelRequest {
        let operation = selected.task.operation();
        ModelRequest {
            input: build_prompt(&selected.task, &self.mappings),
            model_id: selected
                .model
                .clone()
                .unwrap_or_else(|| self.config.model_id.clone()),
            project_id: self.config.project_id.clone(),
            parameters: GenerationParameters::for_operation(operation, &self.config),
        }
    }

    pub async fn execute(&self, selected: SelectedRequest) -> Result<GenerationResult, ServiceError> {
        let operation = selected.task.operation();
        let request = self.build_model_request(&selected);
        info!(
            %operation,
            framework = selected.task.framework().as_str(),
            model_id = %request.model_id,
            input_len = request.input.len(),
            "sending prompt to model"
        );

        let response = self.gateway.generate_text(&request).await.map_err(|e| {
            error!(%operation, error = %e, "model gateway failed");
            ServiceError::Gateway {
                operation,
                details: e.to_string(),
            }
        })?;

        let raw = response.first_generated_text().ok_or_else(|| {
            error!(%operation, results = response.results.len(), "no generated text in response");
            ServiceError::EmptyGeneration
        })?;

        let options = SanitizeOptions {
            strip_preamble: self.config.strip_preamble
                && matches!(operation, Operation::Generate | Operation::Convert),
        };
        let code = sanitize(raw, options);
        if code.is_empty() {
            error!(%operation, "generated text was empty after cleanup");
            return Err(ServiceError::EmptyGeneration);
        }

        info!(%operation, code_len = code.len(), "code generated");
        Ok(GenerationResult {
            code,
            model: request.model_id,
        })
    }
}
