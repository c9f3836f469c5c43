//! Configuration management for the todo client.
//!
//! Loads configuration from ${TODO_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::storage;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "TODO_API_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly or run `cargo run -p xtask`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments from the template are always present while the user's
/// customized values are preserved.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for configuration and data files.
    //!
    //! TODO_HOME resolution order:
    //! 1. TODO_HOME environment variable (if set)
    //! 2. ~/.config/todo (default)

    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// Returns the client's home directory.
    ///
    /// # Errors
    /// Returns an error if neither TODO_HOME nor a user home directory is available.
    pub fn todo_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("TODO_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("todo"))
            .context("Could not determine home directory (set TODO_HOME)")
    }

    /// Returns the path to the config.toml file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be resolved.
    pub fn config_path() -> Result<PathBuf> {
        Ok(todo_home()?.join("config.toml"))
    }

    /// Returns the path to the persisted key/value storage.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be resolved.
    pub fn storage_path() -> Result<PathBuf> {
        Ok(todo_home()?.join("storage.json"))
    }

    /// Returns the directory that receives log files.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be resolved.
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(todo_home()?.join("logs"))
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote todo API
    pub api_base_url: String,

    /// Timeout for each request in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Log filter directive for the file logger
    pub log_level: String,

    /// Ask for confirmation before deleting a task
    pub confirm_deletes: bool,
}

impl Config {
    pub const DEFAULT_API_BASE_URL: &str = "https://todo-nti.vercel.app";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the API base URL.
    ///
    /// Resolution order:
    /// 1. `override_url` (the `--api-url` flag)
    /// 2. `TODO_API_URL` environment variable
    /// 3. `api_base_url` from config
    ///
    /// Empty values are skipped. The result has no trailing slash.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn resolve_api_base_url(&self, override_url: Option<&str>) -> Result<String> {
        let env_url = std::env::var(API_URL_ENV).ok();
        resolve_base_url(override_url, env_url.as_deref(), &self.api_base_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    /// Saves only the api_base_url field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_api_base_url_to(path: &Path, url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let url = validate_url(url)?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["api_base_url"] = value(url);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with `Config::default()`. Comments come from the template.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        storage::write_atomic(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            confirm_deletes: true,
        }
    }
}

fn resolve_base_url(
    override_url: Option<&str>,
    env_url: Option<&str>,
    config_url: &str,
) -> Result<String> {
    [override_url, env_url, Some(config_url)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map_or_else(
            || validate_url(Config::DEFAULT_API_BASE_URL),
            validate_url,
        )
}

/// Validates that a URL is well-formed and strips any trailing slash.
fn validate_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let parsed =
        url::Url::parse(trimmed).with_context(|| format!("Invalid API base URL: {trimmed}"))?;
    if parsed.cannot_be_a_base() {
        anyhow::bail!("Invalid API base URL: {trimmed}");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
