use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine the user config directory")]
    ConfigDirNotFound,

    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}
