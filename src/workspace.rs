use portal_flow::{ViewSnapshot, Workspace};
use tauri::{AppHandle, Emitter};

use crate::types::WORKSPACE_CHANGED;

/// Draws views by sending snapshots to the webview, which replaces its
/// workspace element with whatever it receives.
pub struct WebviewWorkspace {
    app: AppHandle,
}

impl WebviewWorkspace {
    pub(crate) fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Workspace for WebviewWorkspace {
    fn mount(&self, view: &ViewSnapshot) {
        if let Err(e) = self.app.emit(WORKSPACE_CHANGED, view) {
            log::warn!("Failed to emit {}: {}", WORKSPACE_CHANGED, e);
        }
    }

    fn unmount(&self, view: &ViewSnapshot) {
        if let ViewSnapshot::Form(form) = view {
            log::debug!("workspace: discarding form {} ({})", form.form_id, form.process_id);
        }
    }
}
