//! Runtime settings: where the portal server lives and where results go

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const ENV_SERVER_URL: &str = "PORTAL_SERVER_URL";
pub const ENV_DOWNLOAD_DIR: &str = "PORTAL_DOWNLOAD_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Base URL the process endpoints are resolved against
    pub server_url: String,
    /// Where artifacts are saved; the OS download folder when unset
    pub download_dir: Option<PathBuf>,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            download_dir: None,
        }
    }
}

impl PortalSettings {
    /// Merge defaults, the settings file contents and environment overrides,
    /// in that order of increasing precedence.
    pub fn resolve(
        file_contents: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let mut settings = match file_contents {
            Some(contents) if !contents.trim().is_empty() => {
                serde_json::from_str::<PortalSettings>(contents)
                    .map_err(|e| format!("Failed to parse {}: {}", SETTINGS_FILE, e))?
            }
            _ => PortalSettings::default(),
        };

        if let Some(url) = env(ENV_SERVER_URL).filter(|v| !v.trim().is_empty()) {
            settings.server_url = url;
        }
        if let Some(dir) = env(ENV_DOWNLOAD_DIR).filter(|v| !v.trim().is_empty()) {
            settings.download_dir = Some(PathBuf::from(dir));
        }

        settings.server_url = settings.server_url.trim().to_string();
        if settings.server_url.is_empty() {
            settings.server_url = DEFAULT_SERVER_URL.to_string();
        }

        Ok(settings)
    }

    /// Load from `<config_dir>/settings.json` and the process environment
    pub fn load(config_dir: &Path) -> Result<Self, String> {
        let path = config_dir.join(SETTINGS_FILE);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        Self::resolve(contents.as_deref(), |key| std::env::var(key).ok())
    }
}
