//! Configuration paths and user settings for mini-ide.
//!
//! This module provides the default locations, the optional YAML settings
//! file, and resolution of the compiler path with `~` expansion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default compiler executable, resolved relative to the current directory
pub const DEFAULT_EXECUTABLE_NAME: &str = "mini.exe";
/// Default path for the settings file
const DEFAULT_SETTINGS_PATH: &str = "~/.mini-ide/settings.yml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ColorDefinition {
    pub rgb: Option<(u8, u8, u8)>,
    pub ansi: Option<u8>,
    pub name: Option<String>,
}

impl ColorDefinition {
    pub fn named(name: &str) -> Self {
        Self {
            rgb: None,
            ansi: None,
            name: Some(name.to_string()),
        }
    }
}

/// Colors for the two output regions.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTheme {
    pub stdout_color: Option<ColorDefinition>,
    pub stderr_color: Option<ColorDefinition>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub executable_path: Option<String>,
    pub timeout_secs: Option<u64>,
    pub theme: Option<OutputTheme>,
}

impl Settings {
    /// Wait bound for the compiler; `None` or `0` means wait indefinitely.
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.timeout_secs)
    }

    pub fn stderr_color(&self) -> ColorDefinition {
        self.theme
            .as_ref()
            .and_then(|theme| theme.stderr_color.clone())
            .unwrap_or_else(|| ColorDefinition::named("red"))
    }

    pub fn stdout_color(&self) -> Option<ColorDefinition> {
        self.theme
            .as_ref()
            .and_then(|theme| theme.stdout_color.clone())
    }
}

pub fn timeout_from_secs(timeout_secs: Option<u64>) -> Option<Duration> {
    match timeout_secs {
        None | Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
    }
}

/// Resolves the settings file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// settings path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use mini_ide_core::config::get_settings_path;
///
/// let default_path = get_settings_path(&None);
/// assert!(default_path.ends_with("settings.yml"));
/// ```
pub fn get_settings_path(settings_path_arg: &Option<String>) -> String {
    let settings_path = match settings_path_arg {
        Some(settings_path) => settings_path,
        None => DEFAULT_SETTINGS_PATH,
    };

    shellexpand::tilde(settings_path).to_string()
}

/// Resolves the compiler executable path.
///
/// An explicit argument wins over the settings file, which wins over
/// [`DEFAULT_EXECUTABLE_NAME`]. `~` is expanded; relative paths stay relative
/// to the current working directory.
pub fn resolve_executable_path(executable_arg: &Option<String>, settings: &Settings) -> String {
    let executable_path = executable_arg
        .as_deref()
        .or(settings.executable_path.as_deref())
        .unwrap_or(DEFAULT_EXECUTABLE_NAME);

    shellexpand::tilde(executable_path).to_string()
}
