use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Network
    pub bind_address: String,

    // Track provider (Spotify Web API)
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_refresh_token: String,

    // Round behavior
    /// Wait after a skip before trusting the provider's "now playing" state
    pub settle_delay_ms: u64,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5174".to_string(),
            spotify_client_id: "".to_string(),
            spotify_client_secret: "".to_string(),
            spotify_refresh_token: "".to_string(),
            settle_delay_ms: 1000,
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from file or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit path (used by tests and `--config`)
    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = config_path.with_extension("json.corrupt");
                    let _ = std::fs::rename(config_path, &backup_path);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let config_path = config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Credentials may arrive through the environment instead of the file
    fn apply_env_overrides(&mut self) {
        for (var, field) in [
            ("SPOTIFY_CLIENT_ID", &mut self.spotify_client_id),
            ("SPOTIFY_CLIENT_SECRET", &mut self.spotify_client_secret),
            ("SPOTIFY_REFRESH_TOKEN", &mut self.spotify_refresh_token),
        ] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    *field = value;
                }
            }
        }
        if let Ok(value) = std::env::var("BLINDBEAT_BIND") {
            if !value.is_empty() {
                self.bind_address = value;
            }
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blindbeat")
        .join("config.json")
}
