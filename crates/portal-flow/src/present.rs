//! Turning submit outcomes into alerts and log entries

use serde::Serialize;

use crate::config::WorkflowConfig;
use crate::error::FlowError;
use crate::workflow::SubmitOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Local problem the user can fix right away
    Warning,
    /// Processing failed
    Error,
}

/// Surface through which outcomes reach the user
pub trait Presenter {
    fn alert(&self, kind: AlertKind, message: &str);

    /// Diagnostic record of a failed submission
    fn log_failure(&self, config: &WorkflowConfig, error: &FlowError) {
        log::error!("{} failed: {}", config.id, diagnostic(error));
    }
}

/// Error message followed by its whole source chain
pub fn diagnostic(error: &FlowError) -> String {
    let mut text = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Exactly one user-visible effect per outcome: validation problems are
/// alerted without logging, failures get one log entry and one alert.
pub fn present<P: Presenter + ?Sized>(
    outcome: &SubmitOutcome,
    config: &WorkflowConfig,
    presenter: &P,
) {
    match outcome {
        SubmitOutcome::Delivered(artifact) => {
            log::info!(
                "{} delivered: {} ({} bytes, sha256 {})",
                config.id,
                artifact.path.display(),
                artifact.size_bytes,
                artifact.sha256
            );
        }
        SubmitOutcome::Invalid(failure) => {
            presenter.alert(AlertKind::Warning, &failure.message);
        }
        SubmitOutcome::Failed(error) => {
            presenter.log_failure(config, error);
            presenter.alert(AlertKind::Error, &config.error_message);
        }
        SubmitOutcome::Busy => {
            log::debug!("{}: ignoring submit while busy", config.id);
        }
    }
}
