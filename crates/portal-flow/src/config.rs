//! Static description of one upload workflow

use serde::Serialize;
use std::path::Path;

/// One required file input of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Multipart field name sent to the server
    pub name: String,
    /// Human label shown next to the input
    pub label: String,
    /// Accepted extensions, lowercase, without the leading dot
    pub extensions: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, extensions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Accept hint in input form, e.g. `.xls,.xlsx`
    pub fn accept(&self) -> String {
        self.extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether the path carries one of the accepted extensions.
    ///
    /// This is only a hint for pickers; submission never rejects a file on it.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|accepted| *accepted == ext)
            })
            .unwrap_or(false)
    }
}

/// Immutable parameters of one feature's workflow.
///
/// Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowConfig {
    /// Stable identifier used by the shell to address the process
    pub id: String,
    /// Heading of the form
    pub title: String,
    /// Endpoint path, relative to the server base URL
    pub endpoint: String,
    /// Required inputs, in display and payload order
    pub fields: Vec<FieldSpec>,
    /// File name the artifact is saved under
    pub output_filename: String,
    pub submit_label: String,
    /// Shown when a required file is missing
    pub validation_message: String,
    /// Shown for any processing failure
    pub error_message: String,
}

impl WorkflowConfig {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Labels of every required field, joined for messages
    pub fn required_labels(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check the structural rules a config must satisfy before use.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Workflow id must not be empty".to_string());
        }
        if !self.endpoint.starts_with('/') {
            return Err(format!(
                "Endpoint of '{}' must start with '/': {}",
                self.id, self.endpoint
            ));
        }
        if self.fields.is_empty() {
            return Err(format!("Workflow '{}' declares no input fields", self.id));
        }
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(format!("Workflow '{}' has a field without name", self.id));
            }
            if self.fields[..index].iter().any(|f| f.name == field.name) {
                return Err(format!(
                    "Workflow '{}' declares field '{}' twice",
                    self.id, field.name
                ));
            }
        }
        let name = self.output_filename.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(format!(
                "Output filename of '{}' must be a bare file name: {}",
                self.id, self.output_filename
            ));
        }
        Ok(())
    }
}
