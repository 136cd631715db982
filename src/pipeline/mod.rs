mod mapping;
mod prompt;
mod sanitize;
mod selector;
mod types;

pub use mapping::{ComponentMappingEntry, MappingTable};
pub use prompt::{PromptTemplate, build_prompt, template_for};
pub use sanitize::{END_OF_TEXT_MARKERS, SanitizeOptions, sanitize};
pub use selector::{select, select_for};
pub use types::{
    CodegenTask, GenerationRequest, GenerationResult, Operation, SelectedRequest, TargetFramework,
    design_system_display_name,
};
