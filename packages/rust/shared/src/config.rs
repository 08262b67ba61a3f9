//! Application configuration for Inkpress.
//!
//! User config lives at `~/.inkpress/inkpress.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file — config names the env var that
//! holds each credential.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InkpressError, Result};
use crate::types::PostStatus;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "inkpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".inkpress";

// ---------------------------------------------------------------------------
// Config structs (matching inkpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// OpenRouter (generation endpoint) settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Google Sheets topic source settings.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// WordPress publishing settings.
    #[serde(default)]
    pub wordpress: WordPressConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output directory for markdown files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default status for published posts.
    #[serde(default)]
    pub status: PostStatus,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            status: PostStatus::default(),
        }
    }
}

fn default_output_dir() -> String {
    "blog_posts".into()
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model to use for generation.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API base URL (overridable for testing).
    #[serde(default = "default_openrouter_base")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            base_url: default_openrouter_base(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_openrouter_base() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_generation_timeout() -> u64 {
    120
}

/// `[sheets]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier (from the sheet's URL).
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Cell range holding topic rows: primary keywords, auxiliary keywords,
    /// title. Row 1 is assumed to be headers.
    #[serde(default = "default_sheet_range")]
    pub range: String,

    /// Name of the env var holding the Sheets API key.
    #[serde(default = "default_sheets_key_env")]
    pub api_key_env: String,

    /// Sheets API base URL (overridable for testing).
    #[serde(default = "default_sheets_base")]
    pub base_url: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: default_sheet_range(),
            api_key_env: default_sheets_key_env(),
            base_url: default_sheets_base(),
        }
    }
}

fn default_sheet_range() -> String {
    "A2:C".into()
}
fn default_sheets_key_env() -> String {
    "GOOGLE_SHEETS_API_KEY".into()
}
fn default_sheets_base() -> String {
    "https://sheets.googleapis.com".into()
}

/// `[wordpress]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressConfig {
    /// Site base URL, e.g. `https://blog.example.com`.
    #[serde(default)]
    pub base_url: String,

    /// WordPress username.
    #[serde(default)]
    pub username: String,

    /// Name of the env var holding the application password.
    #[serde(default = "default_wp_password_env")]
    pub app_password_env: String,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            app_password_env: default_wp_password_env(),
        }
    }
}

fn default_wp_password_env() -> String {
    "WORDPRESS_APP_PASSWORD".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.inkpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| InkpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.inkpress/inkpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InkpressError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| InkpressError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| InkpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| InkpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| InkpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a secret from the named env var, failing with a config error when it
/// is unset or empty.
pub fn resolve_env_secret(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(InkpressError::config(format!(
            "credential not found: set the {var_name} environment variable"
        ))),
    }
}

/// Check that the OpenRouter API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.openrouter.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(InkpressError::config(format!(
            "OpenRouter API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://openrouter.ai/keys"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("OPENROUTER_API_KEY"));
        assert!(toml_str.contains("WORDPRESS_APP_PASSWORD"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.output_dir, "blog_posts");
        assert_eq!(parsed.openrouter.default_model, "openai/gpt-4o-mini");
        assert_eq!(parsed.sheets.range, "A2:C");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[sheets]
spreadsheet_id = "1Ek6eNBGc2X0RIynWh"

[wordpress]
base_url = "https://blog.example.com"
username = "editor"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sheets.spreadsheet_id, "1Ek6eNBGc2X0RIynWh");
        assert_eq!(config.sheets.api_key_env, "GOOGLE_SHEETS_API_KEY");
        assert_eq!(config.wordpress.username, "editor");
        assert_eq!(config.defaults.status, PostStatus::Draft);
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.openrouter.api_key_env = "INKPRESS_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn env_secret_resolution() {
        // SAFETY: test-only env mutation with a unique variable name.
        unsafe { std::env::set_var("INKPRESS_TEST_SECRET_99", "hunter2") };
        assert_eq!(
            resolve_env_secret("INKPRESS_TEST_SECRET_99").expect("resolve"),
            "hunter2"
        );
        assert!(resolve_env_secret("INKPRESS_TEST_SECRET_MISSING_99").is_err());
    }
}
