use crate::{
    error::ServiceError,
    pipeline::{CodegenTask, GenerationRequest, Operation, SelectedRequest, TargetFramework},
};

/// Picks the operation from field presence. Convert wins over refine, which
/// wins over generate.
pub fn select(request: GenerationRequest) -> Result<SelectedRequest, ServiceError> {
    if has_convert_fields(&request) {
        select_for(Operation::Convert, request)
    } else if present(&request.prompt).is_some() && present(&request.previous_code).is_some() {
        select_for(Operation::Refine, request)
    } else if present(&request.prompt).is_some() {
        select_for(Operation::Generate, request)
    } else {
        Err(ServiceError::InvalidRequest(
            "missing required fields for any supported operation".into(),
        ))
    }
}

/// Validates a request against one fixed operation, as the per-route
/// handlers do.
pub fn select_for(
    operation: Operation,
    request: GenerationRequest,
) -> Result<SelectedRequest, ServiceError> {
    let GenerationRequest {
        prompt,
        previous_code,
        source_code,
        source_design_system,
        target_framework,
        framework,
        model,
    } = request;
    let model = present(&model).map(str::to_string);

    let task = match operation {
        Operation::Generate => {
            let prompt = required(prompt, "Prompt is required")?;
            CodegenTask::Generate {
                prompt,
                framework: optional_framework(framework)?,
            }
        }
        Operation::Refine => {
            let message = "Prompt and previous code are required";
            let prompt = required(prompt, message)?;
            let previous_code = required(previous_code, message)?;
            CodegenTask::Refine {
                prompt,
                previous_code,
                framework: optional_framework(framework)?,
            }
        }
        Operation::Convert => {
            let message = "Source code, design system, and target framework are required";
            let source_code = required(source_code, message)?;
            let source_design_system = required(source_design_system, message)?;
            let target_framework = required(target_framework, message)?;
            CodegenTask::Convert {
                source_code,
                source_design_system: source_design_system.trim().to_string(),
                target_framework: TargetFramework::parse(&target_framework)?,
            }
        }
    };

    Ok(SelectedRequest { task, model })
}

fn has_convert_fields(request: &GenerationRequest) -> bool {
    present(&request.source_code).is_some()
        && present(&request.source_design_system).is_some()
        && present(&request.target_framework).is_some()
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

fn required(field: Option<String>, message: &str) -> Result<String, ServiceError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest(message.to_string()))
}

fn optional_framework(field: Option<String>) -> Result<TargetFramework, ServiceError> {
    match field.filter(|v| !v.trim().is_empty()) {
        Some(raw) => TargetFramework::parse(&raw),
        None => Ok(TargetFramework::default()),
    }
}
