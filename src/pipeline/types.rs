use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Inbound body shared by every operation. Which fields are present decides
/// the operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: Option<String>,
    pub previous_code: Option<String>,
    pub source_code: Option<String>,
    pub source_design_system: Option<String>,
    pub target_framework: Option<String>,
    pub framework: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Generate,
    Refine,
    Convert,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Generate => "generate",
            Operation::Refine => "refine",
            Operation::Convert => "convert",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output framework for the Carbon code the model writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetFramework {
    #[default]
    React,
    WebComponents,
}

impl TargetFramework {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "react" => Ok(TargetFramework::React),
            "web-components" => Ok(TargetFramework::WebComponents),
            _ => Err(ServiceError::UnsupportedFramework(raw.trim().to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetFramework::React => "react",
            TargetFramework::WebComponents => "web-components",
        }
    }
}

/// Human-readable name for the source design system slugs the UI offers.
/// Anything else is shown verbatim.
pub fn design_system_display_name(slug: &str) -> &str {
    match slug {
        "material-ui" | "material" => "Material UI",
        "bootstrap" => "Bootstrap",
        "ant-design" | "ant" => "Ant Design",
        "chakra-ui" | "chakra" => "Chakra UI",
        "other" => "another design system",
        other => other,
    }
}

/// A request that passed selection: every field the operation needs is
/// present and the framework is supported.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenTask {
    Generate {
        prompt: String,
        framework: TargetFramework,
    },
    Refine {
        prompt: String,
        previous_code: String,
        framework: TargetFramework,
    },
    Convert {
        source_code: String,
        source_design_system: String,
        target_framework: TargetFramework,
    },
}

impl CodegenTask {
    pub fn operation(&self) -> Operation {
        match self {
            CodegenTask::Generate { .. } => Operation::Generate,
            CodegenTask::Refine { .. } => Operation::Refine,
            CodegenTask::Convert { .. } => Operation::Convert,
        }
    }

    pub fn framework(&self) -> TargetFramework {
        match self {
            CodegenTask::Generate { framework, .. } | CodegenTask::Refine { framework, .. } => {
                *framework
            }
            CodegenTask::Convert {
                target_framework, ..
            } => *target_framework,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRequest {
    pub task: CodegenTask,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub code: String,
    pub model: String,
}
