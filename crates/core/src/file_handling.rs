//! File handling for program sources and settings.
//!
//! Source files are plain UTF-8 text of any extension, read and written as a
//! whole. The settings file is optional YAML.

use std::fs::{self, File};
use std::path::Path;

use log::debug;

use crate::config::Settings;
use crate::error::{Error, Result};

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    File::open(path).map_err(|e| Error::io_error(file_description.to_string(), path.to_string(), e))
}

/// Reads a whole source file as UTF-8 text.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file is missing, unreadable, or not valid UTF-8.
pub fn load_text(path: &str) -> Result<String> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io_error("source".to_string(), path.to_string(), e))?;
    debug!("Loaded {} bytes from `{}`", text.len(), path);
    Ok(text)
}

/// Writes `text` to `path` as UTF-8, replacing any existing content.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created or written.
pub fn save_text(path: &str, text: &str) -> Result<()> {
    fs::write(path, text)
        .map_err(|e| Error::io_error("source".to_string(), path.to_string(), e))?;
    debug!("Saved {} bytes to `{}`", text.len(), path);
    Ok(())
}

/// Loads the settings file, falling back to defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - The file contains invalid YAML or doesn't match the settings structure
pub fn get_settings(settings_path: &str) -> Result<Settings> {
    if !Path::new(settings_path).exists() {
        debug!("No settings file at `{}`, using defaults", settings_path);
        return Ok(Settings::default());
    }

    let reader = get_reader("settings", settings_path)?;

    // An empty file deserializes as YAML null
    let settings: Option<Settings> = serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "settings".to_string(),
            settings_path.to_string(),
            e,
        )
    })?;

    Ok(settings.unwrap_or_default())
}
