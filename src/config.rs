use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Connection settings for the remote letter store (a Supabase-style
/// PostgREST endpoint). When this section is absent the card still works,
/// it just never resolves shared letters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "user_letters".to_string()
}

fn default_share_base_url() -> String {
    "https://lovenote.cards/".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote letter store; optional so a fresh install launches cleanly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    /// Base URL that share links are built against.
    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    /// Skips the ambient heart ticker when set (checked once at startup).
    #[serde(default)]
    pub reduced_motion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: None,
            share_base_url: default_share_base_url(),
            reduced_motion: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env_fallbacks();
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".lovenote").join("config.yaml")
    }

    /// Never fails the launch: a broken or missing config file degrades to
    /// defaults (and therefore to built-in letters).
    pub fn load_or_default() -> Self {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            if let Ok(config) = Self::load_from_file(&config_path) {
                return config;
            }
            crate::utils::logger::warn(&format!(
                "config at {} failed to parse, using defaults",
                config_path.display()
            ));
        }

        let mut config = Self::default();
        config.apply_env_fallbacks();
        config
    }

    /// Environment variables fill in a missing store section so CI and
    /// one-off runs don't need a config file.
    fn apply_env_fallbacks(&mut self) {
        if self.store.is_none() {
            let url = std::env::var("LOVENOTE_SUPABASE_URL").unwrap_or_default();
            let api_key = std::env::var("LOVENOTE_SUPABASE_KEY").unwrap_or_default();

            if !url.is_empty() && !api_key.is_empty() {
                self.store = Some(StoreConfig {
                    url,
                    api_key,
                    table: default_table(),
                });
            }
        }
    }
}
