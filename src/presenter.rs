use portal_flow::{AlertKind, Presenter};
use tauri::{AppHandle, Emitter};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::types::{WorkflowAlert, WORKFLOW_ALERT};

const DIALOG_TITLE: &str = "Portal de Procesos";

/// Native message box plus an alert event for the page
pub(crate) struct DialogPresenter<'a> {
    app: &'a AppHandle,
}

impl<'a> DialogPresenter<'a> {
    pub(crate) fn new(app: &'a AppHandle) -> Self {
        Self { app }
    }
}

impl Presenter for DialogPresenter<'_> {
    fn alert(&self, kind: AlertKind, message: &str) {
        let payload = WorkflowAlert {
            kind,
            message: message.to_string(),
        };
        if let Err(e) = self.app.emit(WORKFLOW_ALERT, payload) {
            log::warn!("Failed to emit {}: {}", WORKFLOW_ALERT, e);
        }

        let dialog_kind = match kind {
            AlertKind::Warning => MessageDialogKind::Warning,
            AlertKind::Error => MessageDialogKind::Error,
        };
        // Non-blocking: the command returns while the box is still open
        self.app
            .dialog()
            .message(message)
            .title(DIALOG_TITLE)
            .kind(dialog_kind)
            .show(|_| {});
    }
}
