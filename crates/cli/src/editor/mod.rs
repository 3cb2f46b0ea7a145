//! Interactive line editor.
//!
//! This module drives an [`EditorSession`] from lines of terminal input. Input
//! is read on its own thread and compiler runs execute on the session's
//! worker thread, so the loop keeps accepting commands (including `:cancel`)
//! while the compiler is busy.
//!
//! # User Interface
//!
//! - Plain lines are appended to the program buffer
//! - Lines starting with `:` are commands, see [`commands::HELP_TEXT`]
//! - End of input waits for an active run to finish, `:quit` cancels it

use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use log::debug;
use mini_ide_core::error::{Error, Result};
use mini_ide_core::session::{render_output, EditorSession, Notification};

use crate::output::{exit_note, write_notification, write_output_region, OutputStyle};

pub mod commands;
pub mod input;

use commands::{parse_line, EditorCommand, HELP_TEXT};
use input::InputEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Editor<W: Write> {
    session: EditorSession,
    style: OutputStyle,
    out: W,
}

impl<W: Write> Editor<W> {
    pub fn new(session: EditorSession, style: OutputStyle, out: W) -> Self {
        Self {
            session,
            style,
            out,
        }
    }

    pub fn into_parts(self) -> (EditorSession, W) {
        (self.session, self.out)
    }

    /// Processes input until `:quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing to the terminal fails.
    /// Session errors are reported as notifications, not returned.
    pub fn run(&mut self, input: &Receiver<InputEvent>) -> Result<()> {
        self.write_plain("mini-ide editor. Type :help for commands.\n")?;

        loop {
            match input.recv_timeout(POLL_INTERVAL) {
                Ok(InputEvent::Line(line)) => {
                    if self.handle(parse_line(&line))? == Flow::Quit {
                        return self.shutdown(true);
                    }
                }
                Ok(InputEvent::Eof) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("End of editor input");
                    return self.shutdown(false);
                }
                Ok(InputEvent::Failed(e)) => {
                    self.shutdown(true)?;
                    return Err(Error::Terminal(e));
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            if let Some(outcome) = self.session.poll_run() {
                self.report(outcome)?;
            }
        }
    }

    fn handle(&mut self, command: EditorCommand) -> Result<Flow> {
        match command {
            EditorCommand::Append(line) => self.session.buffer_mut().push_line(&line),
            EditorCommand::Run => match self.session.run() {
                Ok(()) => {
                    let message = format!("Running `{}`...\n", self.session.executable_path());
                    self.write_plain(&message)?;
                }
                Err(e) => self.notify(Notification::from(&e))?,
            },
            EditorCommand::Cancel => match self.session.cancel_run() {
                Ok(()) => self.write_plain("Cancelling run...\n")?,
                Err(e) => self.notify(Notification::from(&e))?,
            },
            EditorCommand::Show => self.write_buffer()?,
            EditorCommand::ShowOutput => self.write_output()?,
            EditorCommand::ClearCode => {
                self.session.clear_code();
                self.write_plain("Buffer cleared.\n")?;
            }
            EditorCommand::ClearOutput => {
                self.session.clear_output();
                self.write_plain("Output cleared.\n")?;
            }
            EditorCommand::Open(path) => match self.session.load_file(&path) {
                Ok(()) => self.write_plain(&format!("Loaded `{path}`.\n"))?,
                Err(e) => self.notify(Notification::open_failed(&e))?,
            },
            EditorCommand::Save(path) => match self.session.save_file(&path) {
                Ok(()) => self.write_plain(&format!("Saved `{path}`.\n"))?,
                Err(e) => self.notify(Notification::save_failed(&e))?,
            },
            EditorCommand::Sample => {
                self.session.insert_sample();
                self.write_plain("Sample program inserted.\n")?;
            }
            EditorCommand::About => {
                let about = self.session.about();
                self.write_plain(&about)?;
            }
            EditorCommand::Help => self.write_plain(HELP_TEXT)?,
            EditorCommand::Quit => return Ok(Flow::Quit),
            EditorCommand::MissingPath(name) => {
                self.write_plain(&format!("Usage: :{name} PATH\n"))?;
            }
            EditorCommand::Unknown(command) => {
                self.write_plain(&format!("Unknown command `:{command}`.\n"))?;
                self.write_plain(HELP_TEXT)?;
            }
        }

        Ok(Flow::Continue)
    }

    fn shutdown(&mut self, cancel: bool) -> Result<()> {
        if !self.session.is_running() {
            return Ok(());
        }

        if cancel {
            self.session.cancel_run()?;
        } else {
            self.write_plain("Waiting for the compiler to finish...\n")?;
        }

        let outcome = self.session.wait_run();
        self.report(outcome)
    }

    fn report(&mut self, outcome: Result<()>) -> Result<()> {
        if let Err(e) = outcome {
            return self.notify(Notification::from(&e));
        }

        self.write_output()
    }

    fn write_output(&mut self) -> Result<()> {
        let Some(result) = self.session.last_result() else {
            return self.write_plain("(no output)\n");
        };

        if render_output(result).is_empty() && exit_note(result).is_none() {
            return self.write_plain("(no output)\n");
        }

        write_output_region(&mut self.out, result, &self.style)
    }

    fn write_buffer(&mut self) -> Result<()> {
        if self.session.buffer().is_blank() {
            return self.write_plain("(buffer is empty)\n");
        }

        let mut text = self.session.buffer().snapshot();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        self.write_plain(&text)
    }

    fn notify(&mut self, notification: Notification) -> Result<()> {
        write_notification(&mut self.out, &notification)
    }

    fn write_plain(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Runs the interactive editor until the user quits or input ends.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub fn run_editor<W: Write>(
    session: EditorSession,
    style: OutputStyle,
    input: &Receiver<InputEvent>,
    out: W,
) -> Result<()> {
    Editor::new(session, style, out).run(input)
}
