//! Settings persistence collaborator
//!
//! JSON settings in the user config directory with an atomic tmp-rename
//! write, plus keyring-backed storage for provider API keys. Consumed by the
//! rest of the app through plain load/save; the core never depends on the
//! shape of what's stored here.

use keyring::Entry;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

mod error;
mod types;

pub use error::SettingsError;
pub use types::*;

const KEYRING_SERVICE: &str = "glint";

#[derive(Debug)]
pub struct SettingsManager {
    settings: Arc<RwLock<Settings>>,
    file_path: PathBuf,
}

impl SettingsManager {
    pub async fn new() -> Result<Self, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::ConfigDirNotFound)?;
        Self::with_path(config_dir.join("glint").join("settings.json")).await
    }

    /// Load from an explicit path (tests use a temp dir)
    pub async fn with_path(file_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let settings = if file_path.exists() {
            let content = tokio::fs::read_to_string(&file_path).await?;
            serde_json::from_str(&content)?
        } else {
            Settings::default()
        };

        info!("[settings] loaded from {}", file_path.display());
        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            file_path,
        })
    }

    pub async fn save(&self) -> Result<(), SettingsError> {
        let settings = self.settings.read().await;
        let content = serde_json::to_string_pretty(&*settings)?;

        // write to a temp file, then rename atomically
        let temp_path = self.file_path.with_extension("tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(temp_path, &self.file_path).await?;
        Ok(())
    }

    pub async fn get_settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn update_settings(&self, new_settings: Settings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write().await = new_settings;
        self.save().await
    }

    pub fn store_api_key(&self, provider: &str, key: &str) -> Result<(), SettingsError> {
        let entry = Entry::new(KEYRING_SERVICE, provider)?;
        entry.set_password(key)?;
        Ok(())
    }

    pub fn get_api_key(&self, provider: &str) -> Result<String, SettingsError> {
        let entry = Entry::new(KEYRING_SERVICE, provider)?;
        Ok(entry.get_password()?)
    }

    pub fn delete_api_key(&self, provider: &str) -> Result<(), SettingsError> {
        let entry = Entry::new(KEYRING_SERVICE, provider)?;
        entry.delete_credential()?;
        Ok(())
    }
}
