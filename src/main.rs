use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use carbon_codegen_service::{
    AppConfig, CodegenService, MappingTable, WatsonxGateway, build_router, telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Arc::new(AppConfig::from_env().context("invalid configuration")?);
    tracing::info!(
        ?config.listen_addr,
        endpoint = %config.endpoint,
        model_id = %config.model_id,
        "starting code generation service"
    );

    let mappings = Arc::new(MappingTable::load(config.mapping_table_path.as_deref())?);
    tracing::info!(entries = mappings.len(), "component mapping table loaded");

    let gateway = Arc::new(WatsonxGateway::new(config.as_ref())?);
    if config.verify_on_startup {
        gateway
            .verify_credentials()
            .await
            .context("watsonx credential check failed")?;
        tracing::info!("watsonx authentication successful");
    }

    let service = Arc::new(CodegenService::new(config.clone(), gateway, mappings));
    let router = build_router(service);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "REST server ready");

    axum::serve(listener, router).await?;

    Ok(())
}
