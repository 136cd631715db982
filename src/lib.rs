pub mod config;
pub mod error;
pub mod function;
pub mod gateway;
pub mod pipeline;
pub mod server;
pub mod service;
pub mod telemetry;

pub use config::AppConfig;
pub use error::ServiceError;
pub use gateway::{ModelGateway, WatsonxGateway};
pub use pipeline::{GenerationRequest, GenerationResult, MappingTable};
pub use server::build_router;
pub use service::CodegenService;
