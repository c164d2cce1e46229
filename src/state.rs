use std::sync::Arc;

use portal_flow::{catalog, DirectorySink, HttpTransport, ViewController, Workflow, WorkflowConfig};
use tauri::{AppHandle, Manager};

use crate::settings::PortalSettings;
use crate::workspace::WebviewWorkspace;

/// Managed state shared by all commands
pub struct PortalState {
    pub settings: PortalSettings,
    pub catalog: Vec<Arc<WorkflowConfig>>,
    pub workflow: Workflow<DirectorySink>,
    pub views: ViewController<WebviewWorkspace>,
}

impl PortalState {
    pub(crate) fn build(app: &AppHandle) -> Result<Self, String> {
        let config_dir = app
            .path()
            .app_config_dir()
            .map_err(|e| format!("Failed to get app config dir: {}", e))?;
        let settings = PortalSettings::load(&config_dir)?;

        let catalog = catalog::all();
        for config in &catalog {
            config.validate()?;
        }

        let download_dir = match settings.download_dir.clone() {
            Some(dir) => dir,
            None => app
                .path()
                .download_dir()
                .map_err(|e| format!("Failed to get download dir: {}", e))?,
        };

        let transport = HttpTransport::new(&settings.server_url).map_err(|e| e.to_string())?;
        log::info!(
            "portal: server {} downloads to {}",
            transport.base_url(),
            download_dir.display()
        );

        Ok(Self {
            settings,
            catalog,
            workflow: Workflow::new(transport, DirectorySink::new(download_dir)),
            views: ViewController::new(WebviewWorkspace::new(app.clone())),
        })
    }

    pub(crate) fn process(&self, id: &str) -> Result<Arc<WorkflowConfig>, String> {
        catalog::find(&self.catalog, id).ok_or_else(|| format!("Unknown process: {}", id))
    }
}
