//! File picks of a form and the per-submission snapshot built from them

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};

use crate::config::WorkflowConfig;
use crate::error::FlowError;

/// A file picked for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub field: String,
    pub path: PathBuf,
}

impl SelectedFile {
    /// File name sent in the multipart part
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Why a submission was refused before reaching the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Names of the fields without a pick
    pub missing: Vec<String>,
    /// User-facing text, naming every required input
    pub message: String,
}

/// Picks currently held by a form, one slot per declared field
#[derive(Debug, Default, Clone)]
pub struct FormSelection {
    picks: HashMap<String, PathBuf>,
}

impl FormSelection {
    /// Set the pick of `field`, returning the one it replaced
    pub fn set(
        &mut self,
        config: &WorkflowConfig,
        field: &str,
        path: PathBuf,
    ) -> Result<Option<PathBuf>, FlowError> {
        Self::check_field(config, field)?;
        if path.as_os_str().is_empty() {
            return Ok(self.picks.remove(field));
        }
        Ok(self.picks.insert(field.to_string(), path))
    }

    pub fn clear(
        &mut self,
        config: &WorkflowConfig,
        field: &str,
    ) -> Result<Option<PathBuf>, FlowError> {
        Self::check_field(config, field)?;
        Ok(self.picks.remove(field))
    }

    pub fn get(&self, field: &str) -> Option<&Path> {
        self.picks.get(field).map(PathBuf::as_path)
    }

    /// Freeze the picks into the state of one submission.
    ///
    /// Fails unless every required field has exactly one pick.
    pub fn snapshot(&self, config: &WorkflowConfig) -> Result<SelectionState, ValidationFailure> {
        let mut files = Vec::with_capacity(config.fields.len());
        let mut missing = Vec::new();

        for field in &config.fields {
            match self.picks.get(&field.name) {
                Some(path) => files.push(SelectedFile {
                    field: field.name.clone(),
                    path: path.clone(),
                }),
                None => missing.push(field.name.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(ValidationFailure {
                missing,
                message: format!(
                    "{} ({})",
                    config.validation_message,
                    config.required_labels()
                ),
            });
        }

        Ok(SelectionState { files })
    }

    fn check_field(config: &WorkflowConfig, field: &str) -> Result<(), FlowError> {
        match config.field(field) {
            Some(_) => Ok(()),
            None => Err(FlowError::UnknownField {
                field: field.to_string(),
            }),
        }
    }
}

/// Files of a single submit attempt, in the config's field order.
///
/// Consumed when the payload is built.
#[derive(Debug)]
pub struct SelectionState {
    files: Vec<SelectedFile>,
}

impl SelectionState {
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Read every picked file and build the multipart body
    pub async fn into_payload(self, url: &str) -> Result<Form, FlowError> {
        let mut form = Form::new();

        for file in self.files {
            let data = tokio::fs::read(&file.path)
                .await
                .map_err(|source| FlowError::ReadSelection {
                    field: file.field.clone(),
                    path: file.path.clone(),
                    source,
                })?;

            log::debug!(
                "payload: field={} file={} bytes={}",
                file.field,
                file.path.display(),
                data.len()
            );

            let part = Part::bytes(data)
                .file_name(file.file_name())
                .mime_str(mime_for(&file.path))
                .map_err(|source| FlowError::Transport {
                    url: url.to_string(),
                    source,
                })?;
            form = form.part(file.field, part);
        }

        Ok(form)
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}
