use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// JSON document holding the notification collection
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// When false the store lives in memory only and nothing is written to disk
    #[serde(default = "default_persist")]
    pub persist: bool,
    /// Import the built-in welcome records when the document is first created
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,
    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            http_port: default_http_port(),
            data_file: default_data_file(),
            persist: default_persist(),
            seed_defaults: default_seed_defaults(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

// ---- Seed file types (used by `init-seed` CLI subcommand) ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub notifications: Vec<beacon_common::types::NotificationRecord>,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_data_file() -> String {
    "data/db.json".to_string()
}

fn default_persist() -> bool {
    true
}

fn default_seed_defaults() -> bool {
    true
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults. Environment
    /// overrides are applied in both cases.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::load(path)?
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// `PORT` overrides `http_port`, `BEACON_DATA_FILE` overrides `data_file`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(port) = lookup("PORT") {
            self.http_port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{port}': {e}"))?;
        }
        if let Some(file) = lookup("BEACON_DATA_FILE") {
            if !file.trim().is_empty() {
                self.data_file = file;
            }
        }
        Ok(())
    }
}
