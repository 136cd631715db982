use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

const BUNDLED_TABLE: &str = include_str!("../../data/component_mapping.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMappingEntry {
    #[serde(rename = "material_component")]
    pub source_component: String,
    #[serde(rename = "carbon_component")]
    pub target_component: String,
    #[serde(rename = "alignment_notes", default)]
    pub notes: String,
}

impl ComponentMappingEntry {
    /// `source -> target (notes)`, or without the parenthesised part when
    /// there are no notes.
    pub fn render(&self) -> String {
        if self.notes.trim().is_empty() {
            format!("{} -> {}", self.source_component, self.target_component)
        } else {
            format!(
                "{} -> {} ({})",
                self.source_component, self.target_component, self.notes
            )
        }
    }
}

/// Ordered, read-only table of source to Carbon component pairs. Loaded once
/// and shared by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingTable {
    entries: Vec<ComponentMappingEntry>,
}

impl MappingTable {
    pub fn bundled() -> Result<Self, ServiceError> {
        Self::parse(BUNDLED_TABLE, "bundled mapping table")
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ServiceError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ServiceError::Configuration(format!(
                "cannot read mapping table {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    /// Uses the file when one is configured, the bundled table otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ServiceError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::bundled(),
        }
    }

    fn parse(raw: &str, origin: &str) -> Result<Self, ServiceError> {
        let entries: Vec<ComponentMappingEntry> = serde_json::from_str(raw)
            .map_err(|e| ServiceError::Configuration(format!("invalid {origin}: {e}")))?;

        for (idx, entry) in entries.iter().enumerate() {
            if entry.source_component.trim().is_empty() || entry.target_component.trim().is_empty()
            {
                return Err(ServiceError::Configuration(format!(
                    "{origin}: entry {idx} needs both component names"
                )));
            }
        }
        if entries.is_empty() {
            return Err(ServiceError::Configuration(format!(
                "{origin} has no entries"
            )));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ComponentMappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newline-separated `source -> target (notes)` lines in table order.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ComponentMappingEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
