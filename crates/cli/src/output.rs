//! Terminal rendering of compiler results and notifications.

use std::io::Write;

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use mini_ide_core::config::Settings;
use mini_ide_core::error::Result;
use mini_ide_core::execution::ExecutionResult;
use mini_ide_core::session::{Notification, Severity, STDERR_HEADER};

use crate::colors::color_from_definition;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStyle {
    pub stdout: Option<Color>,
    pub stderr: Option<Color>,
}

impl OutputStyle {
    /// Builds the style from the settings theme.
    ///
    /// # Errors
    ///
    /// Returns an error if a theme color is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            stdout: color_from_definition(settings.stdout_color().as_ref())?,
            stderr: color_from_definition(Some(&settings.stderr_color()))?,
        })
    }
}

fn write_colored<W: Write>(out: &mut W, text: &str, color: Option<Color>) -> Result<()> {
    match color {
        Some(color) => queue!(out, SetForegroundColor(color), Print(text), ResetColor)?,
        None => queue!(out, Print(text))?,
    }
    Ok(())
}

/// Short note for an abnormal exit, or `None` for a clean one.
pub fn exit_note(result: &ExecutionResult) -> Option<String> {
    if result.success() {
        return None;
    }

    if let Some(signal) = result.signal {
        return Some(format!("[terminated by signal {signal}]"));
    }

    if result.exit_code != 0 {
        return Some(format!("[exit code {}]", result.exit_code));
    }

    None
}

/// Process exit status to report for a finished run.
pub fn exit_status_byte(result: &ExecutionResult) -> u8 {
    if result.signal.is_some() {
        return 1;
    }

    u8::try_from(result.exit_code).unwrap_or(1)
}

/// Writes the output region: stdout, then the `[stderr]` section, then any exit note.
pub fn write_output_region<W: Write>(
    out: &mut W,
    result: &ExecutionResult,
    style: &OutputStyle,
) -> Result<()> {
    if !result.stdout.is_empty() {
        write_colored(out, &result.stdout, style.stdout)?;
    }

    if !result.stderr.is_empty() {
        write_colored(out, STDERR_HEADER, style.stderr)?;
        write_colored(out, &result.stderr, style.stderr)?;
    }

    if let Some(note) = exit_note(result) {
        let last = if result.stderr.is_empty() {
            &result.stdout
        } else {
            &result.stderr
        };
        if !last.is_empty() && !last.ends_with('\n') {
            queue!(out, Print("\n"))?;
        }
        queue!(out, Print(note), Print("\n"))?;
    }

    out.flush()?;
    Ok(())
}

/// Writes stdout and stderr to separate streams, with the exit note on `err`.
pub fn write_streams<O: Write, E: Write>(
    out: &mut O,
    err: &mut E,
    result: &ExecutionResult,
    style: &OutputStyle,
) -> Result<()> {
    if !result.stdout.is_empty() {
        write_colored(out, &result.stdout, style.stdout)?;
    }
    out.flush()?;

    if !result.stderr.is_empty() {
        write_colored(err, &result.stderr, style.stderr)?;
    }
    if let Some(note) = exit_note(result) {
        if !result.stderr.is_empty() && !result.stderr.ends_with('\n') {
            queue!(err, Print("\n"))?;
        }
        queue!(err, Print(note), Print("\n"))?;
    }
    err.flush()?;
    Ok(())
}

pub fn write_notification<W: Write>(out: &mut W, notification: &Notification) -> Result<()> {
    let color = match notification.severity {
        Severity::Info => Color::Cyan,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    };

    write_colored(out, &notification.title, Some(color))?;
    queue!(out, Print(": "), Print(&notification.message), Print("\n"))?;
    out.flush()?;
    Ok(())
}
