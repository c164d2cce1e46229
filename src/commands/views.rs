//! Navigation commands: which view owns the workspace

use portal_flow::{FormView, ViewSnapshot};
use tauri::State;

use crate::settings::PortalSettings;
use crate::state::PortalState;
use crate::types::ProcessSummary;

/// Processes available in the navigation menu
#[tauri::command]
pub fn list_processes(state: State<'_, PortalState>) -> Vec<ProcessSummary> {
    state
        .catalog
        .iter()
        .map(|config| ProcessSummary::from(config.as_ref()))
        .collect()
}

#[tauri::command]
pub fn show_home(state: State<'_, PortalState>) {
    state.views.show_home();
}

/// Replace the workspace with a fresh form for `process_id`
#[tauri::command]
pub fn show_process(state: State<'_, PortalState>, process_id: String) -> Result<FormView, String> {
    let config = state.process(&process_id)?;
    let form = state.views.render(config);
    Ok(FormView::of(&form))
}

/// Redraw whatever the workspace currently shows (used on page reload)
#[tauri::command]
pub fn current_view(state: State<'_, PortalState>) -> ViewSnapshot {
    state.views.refresh()
}

#[tauri::command]
pub fn get_settings(state: State<'_, PortalState>) -> PortalSettings {
    state.settings.clone()
}
