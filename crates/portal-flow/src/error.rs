//! Error types for the submission pipeline

use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;

/// Everything that can end a submission attempt after validation passed,
/// plus the configuration errors raised while wiring a workflow up.
#[derive(Debug)]
pub enum FlowError {
    /// The configured server base URL could not be parsed
    InvalidBaseUrl { url: String, reason: String },
    /// The HTTP client itself could not be set up
    Client { source: reqwest::Error },
    /// A form operation named a field the workflow does not declare
    UnknownField { field: String },
    /// A selected file could not be read into the payload
    ReadSelection {
        field: String,
        path: PathBuf,
        source: std::io::Error,
    },
    /// The request could not be built or sent
    Transport { url: String, source: reqwest::Error },
    /// The server answered with a non-success status; the body is not read
    Status { url: String, status: StatusCode },
    /// The success body could not be read
    Body { url: String, source: reqwest::Error },
    /// The artifact could not be staged or saved
    Save {
        file_name: String,
        source: std::io::Error,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::InvalidBaseUrl { url, reason } => {
                write!(f, "Invalid server URL '{}': {}", url, reason)
            }
            FlowError::Client { source } => write!(f, "Failed to create HTTP client: {}", source),
            FlowError::UnknownField { field } => write!(f, "Unknown form field: {}", field),
            FlowError::ReadSelection { field, path, source } => write!(
                f,
                "Failed to read file for '{}' ({}): {}",
                field,
                path.display(),
                source
            ),
            FlowError::Transport { url, source } => {
                write!(f, "Request to {} failed: {}", url, source)
            }
            FlowError::Status { url, status } => {
                write!(f, "Server rejected request to {}: {}", url, status)
            }
            FlowError::Body { url, source } => {
                write!(f, "Failed to read response from {}: {}", url, source)
            }
            FlowError::Save { file_name, source } => {
                write!(f, "Failed to save {}: {}", file_name, source)
            }
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::ReadSelection { source, .. } | FlowError::Save { source, .. } => {
                Some(source)
            }
            FlowError::Client { source }
            | FlowError::Transport { source, .. }
            | FlowError::Body { source, .. } => Some(source),
            FlowError::InvalidBaseUrl { .. }
            | FlowError::UnknownField { .. }
            | FlowError::Status { .. } => None,
        }
    }
}

impl FlowError {
    /// HTTP status reported by the server, if the failure came from one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FlowError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
