//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure using the `clap`
//! crate.

use clap::Parser;

/// Command-line arguments for the mini-ide front-end.
///
/// With a source file (or `--sample`) the program is run once and the
/// compiler's output printed. Without one, or with `--interactive`, the line
/// editor starts.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use mini_ide_cli::cli_args::Args;
///
/// let args = Args::parse_from(["mini-ide", "hello.mini"]);
/// assert!(!args.is_interactive());
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the program source file to load.
    #[arg(num_args(1))]
    pub source_path: Option<String>,

    /// Path to the compiler executable.
    ///
    /// Relative paths are resolved against the current directory. If not
    /// provided, the settings file is consulted, then `mini.exe`.
    #[arg(long, short = 'e')]
    pub executable: Option<String>,

    /// Path to the settings YAML file.
    ///
    /// If not provided, defaults to `~/.mini-ide/settings.yml`.
    #[arg(long, short = 'c')]
    pub settings_path: Option<String>,

    /// Stop the compiler if it runs longer than this many seconds.
    ///
    /// `0` waits indefinitely. Overrides `timeout_secs` from the settings file.
    #[arg(long, short = 't')]
    pub timeout_secs: Option<u64>,

    /// Use the bundled sample program as the source.
    #[arg(long, short = 's', action, conflicts_with = "source_path")]
    pub sample: bool,

    /// Start the interactive editor even when a source is given.
    #[arg(long, short = 'i', action)]
    pub interactive: bool,

    /// Save the loaded source to this path before running.
    #[arg(long)]
    pub save_to: Option<String>,
}

impl Args {
    pub fn is_interactive(&self) -> bool {
        self.interactive || (self.source_path.is_none() && !self.sample)
    }
}
