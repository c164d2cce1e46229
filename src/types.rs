//! Event payloads and command results sent to the webview

use portal_flow::{AlertKind, SubmitOutcome, WorkflowConfig};
use serde::Serialize;

pub const WORKSPACE_CHANGED: &str = "workspace-changed";
pub const WORKFLOW_ALERT: &str = "workflow-alert";
pub const SUBMISSION_STATUS_CHANGED: &str = "submission-status-changed";

/// Navigation entry for one process
#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    pub id: String,
    pub title: String,
}

impl From<&WorkflowConfig> for ProcessSummary {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            id: config.id.clone(),
            title: config.title.clone(),
        }
    }
}

/// Alert event payload
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowAlert {
    pub kind: AlertKind,
    pub message: String,
}

/// Status change event payload
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionStatusChanged {
    pub process_id: String,
    pub form_id: u64,
    pub status: String, // "submitting" | "succeeded" | "failed" | "invalid" | "busy"
    pub error: Option<String>,
}

/// Result of `submit_form`, after the outcome has been presented
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub process_id: String,
    pub status: String,
    /// Message shown to the user, if any
    pub message: Option<String>,
    pub saved_path: Option<String>,
    pub size_bytes: Option<u64>,
    pub sha256: Option<String>,
    pub finished_at: String,
}

impl SubmitReport {
    pub fn from_outcome(config: &WorkflowConfig, outcome: &SubmitOutcome) -> Self {
        let mut report = SubmitReport {
            process_id: config.id.clone(),
            status: outcome.status().to_string(),
            message: None,
            saved_path: None,
            size_bytes: None,
            sha256: None,
            finished_at: chrono::Utc::now().to_rfc3339(),
        };

        match outcome {
            SubmitOutcome::Delivered(artifact) => {
                report.saved_path = Some(artifact.path.to_string_lossy().to_string());
                report.size_bytes = Some(artifact.size_bytes);
                report.sha256 = Some(artifact.sha256.clone());
            }
            SubmitOutcome::Invalid(failure) => report.message = Some(failure.message.clone()),
            SubmitOutcome::Failed(_) => report.message = Some(config.error_message.clone()),
            SubmitOutcome::Busy => {}
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::{ProcessSummary, SubmitReport};
    use portal_flow::{catalog, DeliveredArtifact, FlowError, SubmitOutcome, ValidationFailure};
    use std::path::PathBuf;

    #[test]
    fn delivered_report_carries_artifact_details() {
        let config = catalog::inventario();
        let outcome = SubmitOutcome::Delivered(DeliveredArtifact {
            path: PathBuf::from("/home/u/Downloads/Inventario_Cajas.xlsx"),
            size_bytes: 2048,
            sha256: "ab".repeat(32),
            content_type: None,
        });

        let report = SubmitReport::from_outcome(&config, &outcome);

        assert_eq!(report.status, "succeeded");
        assert_eq!(report.size_bytes, Some(2048));
        assert!(report.saved_path.unwrap().ends_with("Inventario_Cajas.xlsx"));
        assert!(report.message.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.finished_at).is_ok());
    }

    #[test]
    fn failure_report_shows_generic_message_only() {
        let config = catalog::liquidacion();
        let outcome = SubmitOutcome::Failed(FlowError::UnknownField {
            field: "x".to_string(),
        });

        let report = SubmitReport::from_outcome(&config, &outcome);

        assert_eq!(report.status, "failed");
        assert_eq!(report.message.as_deref(), Some(config.error_message.as_str()));
        assert!(report.saved_path.is_none());
    }

    #[test]
    fn invalid_report_carries_validation_text() {
        let config = catalog::agendamiento_v2();
        let outcome = SubmitOutcome::Invalid(ValidationFailure {
            missing: vec!["bitrix_file".to_string()],
            message: "Debe seleccionar ambos archivos. (Archivo Manager, Archivo Bitrix)"
                .to_string(),
        });

        let report = SubmitReport::from_outcome(&config, &outcome);

        assert_eq!(report.status, "invalid");
        assert!(report.message.unwrap().contains("Archivo Bitrix"));
    }

    #[test]
    fn summaries_follow_catalog_order() {
        let summaries: Vec<ProcessSummary> = catalog::all()
            .iter()
            .map(|c| ProcessSummary::from(c.as_ref()))
            .collect();
        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["agendamiento-v2", "inventario", "liquidacion"]);
    }
}
