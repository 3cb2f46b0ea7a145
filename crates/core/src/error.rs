use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please write some code before running.")]
    EmptyInput,

    #[error("Could not find '{}' in the current folder.", .path)]
    ExecutableNotFound { path: String },

    #[error("Failed to launch compiler at `{}`: {}", .path, .original)]
    LaunchFailed {
        path: String,
        original: std::io::Error,
    },

    #[error("STDIO error with compiler process: {}", .0)]
    Stdio(std::io::Error),

    #[error("The compiler did not finish within {:?} and was stopped.", .after)]
    Timeout { after: Duration },

    #[error("The run was cancelled before the compiler finished.")]
    Cancelled,

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("For a color, only one of `rgb`, `ansi` or `name` should be defined.")]
    MultipleColorTypes,

    #[error("Unknown color name: \"{}\"", _0)]
    UnknownColorName(String),

    #[error("No run is in progress.")]
    NoActiveRun,

    #[error("A run is already in progress.")]
    RunInProgress,

    #[error("Terminal IO error: {}", .0)]
    Terminal(#[from] std::io::Error),
}

impl Error {
    pub fn executable_not_found(path: String) -> Self {
        Self::ExecutableNotFound { path }
    }

    pub fn launch_failed(path: String, original: std::io::Error) -> Self {
        Self::LaunchFailed { path, original }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }
}
