//! Form commands: picking files and submitting

use std::sync::Arc;

use portal_flow::present::diagnostic;
use portal_flow::{present, FormHandle, FormView, SubmitOutcome};
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_dialog::DialogExt;
use tauri_plugin_opener::OpenerExt;

use crate::presenter::DialogPresenter;
use crate::state::PortalState;
use crate::types::{SubmissionStatusChanged, SubmitReport, SUBMISSION_STATUS_CHANGED};

fn active_form(state: &PortalState, form_id: u64) -> Result<Arc<FormHandle>, String> {
    state
        .views
        .active_form(form_id)
        .ok_or_else(|| format!("Form {} is no longer active", form_id))
}

fn emit_status(app: &AppHandle, form: &FormHandle, status: &str, error: Option<String>) {
    let payload = SubmissionStatusChanged {
        process_id: form.config().id.clone(),
        form_id: form.id(),
        status: status.to_string(),
        error,
    };
    if let Err(e) = app.emit(SUBMISSION_STATUS_CHANGED, payload) {
        log::warn!("Failed to emit {}: {}", SUBMISSION_STATUS_CHANGED, e);
    }
}

/// Pick the file of one field with the native dialog.
///
/// Returns `None` when the dialog was cancelled; the previous pick is kept.
#[tauri::command]
pub async fn pick_file(
    app: AppHandle,
    state: State<'_, PortalState>,
    form_id: u64,
    field: String,
) -> Result<Option<FormView>, String> {
    let form = active_form(&state, form_id)?;
    let spec = form
        .config()
        .field(&field)
        .cloned()
        .ok_or_else(|| format!("Unknown form field: {}", field))?;

    let (tx, rx) = tokio::sync::oneshot::channel();
    let extensions: Vec<&str> = spec.extensions.iter().map(String::as_str).collect();

    app.dialog()
        .file()
        .set_title(spec.label.clone())
        .add_filter(format!("{} ({})", spec.label, spec.accept()), &extensions)
        .pick_file(move |file_path| {
            let _ = tx.send(file_path.and_then(|p| p.into_path().ok()));
        });

    let picked = rx.await.map_err(|_| "Dialog was closed".to_string())?;
    let Some(path) = picked else {
        return Ok(None);
    };

    if !spec.accepts(&path) {
        log::warn!(
            "form {}: {} does not match {} for {}",
            form_id,
            path.display(),
            spec.accept(),
            field
        );
    }

    form.select(&field, path).map_err(|e| e.to_string())?;
    state.views.refresh_form(form_id);
    Ok(Some(FormView::of(&form)))
}

#[tauri::command]
pub fn clear_file(
    state: State<'_, PortalState>,
    form_id: u64,
    field: String,
) -> Result<FormView, String> {
    let form = active_form(&state, form_id)?;
    form.clear(&field).map_err(|e| e.to_string())?;
    state.views.refresh_form(form_id);
    Ok(FormView::of(&form))
}

/// Run the workflow of the active form and present its outcome
#[tauri::command]
pub async fn submit_form(
    app: AppHandle,
    state: State<'_, PortalState>,
    form_id: u64,
) -> Result<SubmitReport, String> {
    let form = active_form(&state, form_id)?;
    let config = form.config().clone();

    let outcome = state
        .workflow
        .submit_observed(&form, |form| emit_status(&app, form, "submitting", None))
        .await;

    present(&outcome, &config, &DialogPresenter::new(&app));

    let error = match &outcome {
        SubmitOutcome::Failed(e) => Some(diagnostic(e)),
        _ => None,
    };
    emit_status(&app, &form, outcome.status(), error);

    // The user may have switched views while the request ran
    if !state.views.refresh_form(form_id) {
        log::info!("form {}: finished after its view was replaced", form_id);
    }

    Ok(SubmitReport::from_outcome(&config, &outcome))
}

/// Show a saved artifact in the system file manager
#[tauri::command]
pub fn reveal_artifact(app: AppHandle, path: String) -> Result<(), String> {
    app.opener()
        .reveal_item_in_dir(&path)
        .map_err(|e| format!("Failed to reveal {}: {}", path, e))
}
