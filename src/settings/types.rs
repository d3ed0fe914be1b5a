use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::SettingsError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub preferences: AppPreferences,
    #[serde(default)]
    pub ai_providers: AiProviderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppPreferences {
    pub window_width: u32,
    pub window_height: u32,
    pub theme: Theme,
    pub startup_behavior: StartupBehavior,
    pub keyboard_shortcuts: KeyboardShortcuts,
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            theme: Theme::System,
            startup_behavior: StartupBehavior::Hidden,
            keyboard_shortcuts: KeyboardShortcuts::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiProviderSettings {
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupBehavior {
    Normal,
    Minimized,
    /// Launcher default: start off-screen, wait for the toggle hotkey
    Hidden,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardShortcuts {
    pub toggle_window: String,
    pub clear_conversation: String,
    pub new_conversation: String,
    #[serde(default)]
    pub custom_shortcuts: HashMap<String, String>,
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        let mut custom_shortcuts = HashMap::new();
        custom_shortcuts.insert("settings".to_string(), "CommandOrControl+,".to_string());

        Self {
            toggle_window: "CommandOrControl+Shift+Space".to_string(),
            clear_conversation: "CommandOrControl+L".to_string(),
            new_conversation: "CommandOrControl+N".to_string(),
            custom_shortcuts,
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), SettingsError>;
}

impl Validate for Settings {
    fn validate(&self) -> Result<(), SettingsError> {
        self.preferences.validate()?;
        self.ai_providers.validate()?;
        Ok(())
    }
}

impl Validate for AppPreferences {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.window_width < 400 {
            return Err(SettingsError::Invalid(
                "window width must be at least 400 pixels".to_string(),
            ));
        }
        if self.window_height < 300 {
            return Err(SettingsError::Invalid(
                "window height must be at least 300 pixels".to_string(),
            ));
        }
        self.keyboard_shortcuts.validate()
    }
}

impl Validate for AiProviderSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        for (name, config) in [("openai", &self.openai), ("anthropic", &self.anthropic)] {
            if let Some(config) = config {
                if !(0.0..=1.0).contains(&config.temperature) {
                    return Err(SettingsError::Invalid(format!(
                        "{name} temperature must be between 0 and 1"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Validate for KeyboardShortcuts {
    fn validate(&self) -> Result<(), SettingsError> {
        let check = |shortcut: &str| -> Result<(), SettingsError> {
            if !shortcut.contains("CommandOrControl") && !shortcut.contains("Alt") {
                return Err(SettingsError::Invalid(format!(
                    "invalid shortcut format: {shortcut}"
                )));
            }
            Ok(())
        };

        check(&self.toggle_window)?;
        check(&self.clear_conversation)?;
        check(&self.new_conversation)?;
        for shortcut in self.custom_shortcuts.values() {
            check(shortcut)?;
        }
        Ok(())
    }
}
