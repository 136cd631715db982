//! Prompt templates for the three operations.
//!
//! Every `(Operation, TargetFramework)` pair resolves to one explicit
//! [`PromptTemplate`]. A rendered prompt is, in order: persona and task
//! sentence, the mapping table (convert only), the numbered requirements,
//! the caller's payload, and the closing output directive.

use crate::pipeline::{
    CodegenTask, MappingTable, Operation, TargetFramework, design_system_display_name,
};

const REACT_PERSONA: &str = "You are a React developer specializing in IBM Carbon Design System.";
const WEB_COMPONENTS_PERSONA: &str =
    "You are a front-end developer specializing in IBM Carbon Design System web components.";

const REACT_REQUIREMENTS: &[&str] = &[
    "Always include necessary imports from '@carbon/react'",
    "Use proper component structure with TypeScript types",
    "Include proper prop types and default props",
    "Add comments for complex logic",
    "Follow Carbon Design System naming conventions",
    "Include proper accessibility attributes",
    "Use Carbon's built-in components and utilities",
    "Never hallucinate, only use components that are part of the Carbon Design System",
];

const WEB_COMPONENTS_REQUIREMENTS: &[&str] = &[
    "Import every element from '@carbon/web-components' (for example '@carbon/web-components/es/components/button/index.js')",
    "Use the cds- prefixed custom elements such as <cds-button> and <cds-text-input>",
    "Define new custom elements with customElements.define and keep their markup and styles inside the shadow DOM",
    "Theme through Carbon CSS custom properties instead of hard-coded colors",
    "Pass data through attributes and properties and listen for the cds- prefixed custom events",
    "Follow Carbon Design System naming conventions",
    "Include proper accessibility attributes",
    "Never hallucinate, only use elements that are part of the Carbon web components library",
];

const REFINE_REQUIREMENTS: &[&str] = &[
    "Apply the requested changes and keep everything else as it is",
    "Return the complete component, not a diff or a fragment",
];

const CONVERT_REQUIREMENTS: &[&str] = &[
    "Convert all UI components to their Carbon Design System equivalents",
    "Maintain the same functionality and behavior",
    "Preserve component structure and props where Carbon supports them",
];

const OUTPUT_DIRECTIVE: &str =
    "Return only the code, with no explanations before or after it and no markdown fences.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptTemplate {
    pub operation: Operation,
    pub framework: TargetFramework,
    pub persona: &'static str,
    /// Task sentence. `{source}` is replaced with the source design system.
    pub task: &'static str,
    /// Operation-specific items, listed before the framework items.
    pub operation_requirements: &'static [&'static str],
    pub framework_requirements: &'static [&'static str],
    pub closing: &'static str,
}

impl PromptTemplate {
    pub fn requirements(&self) -> impl Iterator<Item = &'static str> {
        self.operation_requirements
            .iter()
            .chain(self.framework_requirements.iter())
            .copied()
    }
}

pub fn template_for(operation: Operation, framework: TargetFramework) -> PromptTemplate {
    use Operation::*;
    use TargetFramework::*;

    match (operation, framework) {
        (Generate, React) => PromptTemplate {
            operation,
            framework,
            persona: REACT_PERSONA,
            task: "Your task is to generate clean, efficient React code following Carbon Design System best practices.",
            operation_requirements: &[],
            framework_requirements: REACT_REQUIREMENTS,
            closing: "Please provide the complete React component code with all necessary imports and proper structure.",
        },
        (Generate, WebComponents) => PromptTemplate {
            operation,
            framework,
            persona: WEB_COMPONENTS_PERSONA,
            task: "Your task is to generate clean, efficient HTML and JavaScript built on Carbon web components.",
            operation_requirements: &[],
            framework_requirements: WEB_COMPONENTS_REQUIREMENTS,
            closing: "Please provide the complete markup and script with all necessary imports.",
        },
        (Refine, React) => PromptTemplate {
            operation,
            framework,
            persona: REACT_PERSONA,
            task: "Your task is to refine and improve existing React code following Carbon Design System best practices.",
            operation_requirements: REFINE_REQUIREMENTS,
            framework_requirements: REACT_REQUIREMENTS,
            closing: "Please provide the complete updated React component code with all necessary changes.",
        },
        (Refine, WebComponents) => PromptTemplate {
            operation,
            framework,
            persona: WEB_COMPONENTS_PERSONA,
            task: "Your task is to refine and improve existing Carbon web components code.",
            operation_requirements: REFINE_REQUIREMENTS,
            framework_requirements: WEB_COMPONENTS_REQUIREMENTS,
            closing: "Please provide the complete updated markup and script with all necessary changes.",
        },
        (Convert, React) => PromptTemplate {
            operation,
            framework,
            persona: REACT_PERSONA,
            task: "Your task is to convert code from {source} to Carbon Design System components for React.",
            operation_requirements: CONVERT_REQUIREMENTS,
            framework_requirements: REACT_REQUIREMENTS,
            closing: "Please provide the complete converted code using Carbon Design System components.",
        },
        (Convert, WebComponents) => PromptTemplate {
            operation,
            framework,
            persona: WEB_COMPONENTS_PERSONA,
            task: "Your task is to convert code from {source} to Carbon Design System web components.",
            operation_requirements: CONVERT_REQUIREMENTS,
            framework_requirements: WEB_COMPONENTS_REQUIREMENTS,
            closing: "Please provide the complete converted code using Carbon web components.",
        },
    }
}

/// Renders the model input for a validated task. Pure and never empty.
pub fn build_prompt(task: &CodegenTask, mappings: &MappingTable) -> String {
    let template = template_for(task.operation(), task.framework());
    let source = match task {
        CodegenTask::Convert {
            source_design_system,
            ..
        } => design_system_display_name(source_design_system),
        _ => "",
    };

    let mut sections = Vec::with_capacity(5);
    sections.push(format!(
        "{} {}",
        template.persona,
        template.task.replace("{source}", source)
    ));

    if task.operation() == Operation::Convert {
        sections.push(render_mapping_block(source, mappings));
    }

    sections.push(render_requirements(&template));

    sections.push(match task {
        CodegenTask::Generate { prompt, .. } => format!("User request: {prompt}"),
        CodegenTask::Refine {
            prompt,
            previous_code,
            ..
        } => format!("Current code:\n{previous_code}\n\nRequested changes: {prompt}"),
        CodegenTask::Convert { source_code, .. } => {
            format!("Source code in {source}:\n{source_code}")
        }
    });

    sections.push(format!("{} {}", template.closing, OUTPUT_DIRECTIVE));

    sections.join("\n\n")
}

fn render_mapping_block(source: &str, mappings: &MappingTable) -> String {
    format!(
        "Component mapping from {source} to Carbon (source -> Carbon (notes)):\n{}\n\n\
         You MUST use this mapping when converting components. Do not invent components \
         that are not in this mapping or not part of the Carbon Design System.",
        mappings.render()
    )
}

fn render_requirements(template: &PromptTemplate) -> String {
    let items = template
        .requirements()
        .enumerate()
        .map(|(idx, item)| format!("{}. {item}", idx + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Requirements:\n{items}")
}
