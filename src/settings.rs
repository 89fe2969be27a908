use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

static CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs_next::config_dir()
        .map(|d| d.join("homeboard"))
        .unwrap_or_else(|| PathBuf::from("."))
});

/// Directory holding the settings file, session token, layout and per-widget
/// state files.
pub fn config_dir() -> &'static Path {
    &CONFIG_DIR
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Base URL of the backend the widgets talk to.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Authorization endpoint of the OAuth provider. Opened in the system
    /// browser; the issued token is pasted back into the app.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// City used by the weather widget until the user picks one.
    #[serde(default = "default_city")]
    pub default_city: String,
    /// Currencies shown by the exchange-rate widget.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
    /// Poll shown by the poll widget.
    #[serde(default = "default_poll_id")]
    pub poll_id: i64,
    /// Provider passed to the AI chat endpoint.
    #[serde(default = "default_ai_provider")]
    pub ai_provider: String,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".into()
}

fn default_auth_url() -> String {
    "https://kauth.kakao.com/oauth/authorize".into()
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

fn default_city() -> String {
    "Seoul".into()
}

fn default_currencies() -> Vec<String> {
    ["USD", "JPY", "EUR", "CNY", "GBP"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_poll_id() -> i64 {
    1
}

fn default_ai_provider() -> String {
    "openai".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth_url: default_auth_url(),
            debug_logging: false,
            enable_toasts: true,
            toast_duration: default_toast_duration(),
            default_city: default_city(),
            currencies: default_currencies(),
            poll_id: default_poll_id(),
            ai_provider: default_ai_provider(),
            window_size: None,
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load(dir.path().join("settings.json")).expect("load");
        assert_eq!(settings.default_city, "Seoul");
        assert!(settings.enable_toasts);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "default_city": "Busan" }"#).expect("write");
        let settings = Settings::load(&path).expect("load");
        assert_eq!(settings.default_city, "Busan");
        assert_eq!(settings.currencies.len(), 5);
        assert_eq!(settings.poll_id, 1);
    }

    #[test]
    fn roundtrip_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.toast_duration = 5.5;
        settings.window_size = Some((640.0, 800.0));
        settings.save(&path).expect("save");
        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded.toast_duration, 5.5);
        assert_eq!(loaded.window_size, Some((640.0, 800.0)));
    }
}
