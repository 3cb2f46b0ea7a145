//! Editor session state owned by the front-end.
//!
//! An [`EditorSession`] owns the program text, the output region and the last
//! [`ExecutionResult`]. Runs happen on a worker thread so the caller's event
//! loop keeps going while the compiler works; the outcome is collected with
//! [`EditorSession::poll_run`] or [`EditorSession::wait_run`].

use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::execution::{
    execute_request, resolve_executable, CancelToken, ExecutionOptions, ExecutionRequest,
    ExecutionResult,
};
use crate::file_handling::{load_text, save_text};

/// Program inserted by [`EditorSession::insert_sample`].
pub const SAMPLE_PROGRAM: &str = r#"/* Sample Program */
name = "Shouvik";
print name;

i = 0;
while (i < 3) {
    print i;
    i = i + 1;
}

for (j = 0; j < 3; j = j + 1) {
    print j;
}
"#;

/// Separator placed before stderr in the output region.
pub const STDERR_HEADER: &str = "\n[stderr]\n";

/// The user's program text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Appends `line` and a trailing newline.
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn snapshot(&self) -> String {
        self.text.clone()
    }
}

/// A compiler run executing on a worker thread.
///
/// Dropping the handle before the run finishes cancels it.
#[derive(Debug)]
pub struct RunHandle {
    receiver: Receiver<Result<ExecutionResult>>,
    cancel: CancelToken,
}

impl RunHandle {
    pub fn spawn(request: ExecutionRequest, options: ExecutionOptions) -> Self {
        let (sender, receiver) = mpsc::channel();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();

        thread::spawn(move || {
            let outcome = execute_request(&request, &options, &worker_cancel);
            if sender.send(outcome).is_err() {
                debug!("Run finished after its handle was dropped");
            }
        });

        Self { receiver, cancel }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns the outcome if the worker has finished, without blocking.
    pub fn try_outcome(&self) -> Option<Result<ExecutionResult>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Blocks until the worker reports.
    pub fn wait(self) -> Result<ExecutionResult> {
        self.receiver.recv().unwrap_or_else(|_| Err(worker_lost()))
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn worker_lost() -> Error {
    Error::Stdio(std::io::Error::other(
        "run worker exited without reporting a result",
    ))
}

/// Formats a result for the output region: stdout, then a `[stderr]` section if present.
pub fn render_output(result: &ExecutionResult) -> String {
    let mut output = String::with_capacity(result.stdout.len() + result.stderr.len());

    if !result.stdout.is_empty() {
        output.push_str(&result.stdout);
    }

    if !result.stderr.is_empty() {
        output.push_str(STDERR_HEADER);
        output.push_str(&result.stderr);
    }

    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A human-readable message for one error condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, title: &str, message: String) -> Self {
        Self {
            severity,
            title: title.to_string(),
            message,
        }
    }

    /// Replaces the title, e.g. to say which file operation failed.
    #[must_use]
    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn open_failed(error: &Error) -> Self {
        Self::from(error).titled("Error Opening File")
    }

    pub fn save_failed(error: &Error) -> Self {
        Self::from(error).titled("Error Saving File")
    }
}

impl From<&Error> for Notification {
    fn from(error: &Error) -> Self {
        let message = error.to_string();
        match error {
            Error::EmptyInput => Self::new(Severity::Warning, "No Code", message),
            Error::ExecutableNotFound { .. } => {
                Self::new(Severity::Error, "Executable Not Found", message)
            }
            Error::LaunchFailed { .. } | Error::Stdio(_) => {
                Self::new(Severity::Error, "Error Running Compiler", message)
            }
            Error::Timeout { .. } => Self::new(Severity::Error, "Compiler Timed Out", message),
            Error::Cancelled => Self::new(Severity::Info, "Run Cancelled", message),
            Error::Io { .. } => Self::new(Severity::Error, "File Error", message),
            Error::Yaml { .. } | Error::MultipleColorTypes | Error::UnknownColorName(_) => {
                Self::new(Severity::Error, "Settings Error", message)
            }
            Error::NoActiveRun => Self::new(Severity::Info, "No Active Run", message),
            Error::RunInProgress => Self::new(Severity::Warning, "Run In Progress", message),
            Error::Terminal(_) => Self::new(Severity::Error, "Terminal Error", message),
        }
    }
}

impl Display for Notification {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}: {}", self.title, self.message)
    }
}

pub struct EditorSession {
    buffer: SourceBuffer,
    output: String,
    last_result: Option<ExecutionResult>,
    executable_path: String,
    options: ExecutionOptions,
    active_run: Option<RunHandle>,
}

impl EditorSession {
    pub fn new(executable_path: impl Into<String>, options: ExecutionOptions) -> Self {
        Self {
            buffer: SourceBuffer::default(),
            output: String::new(),
            last_result: None,
            executable_path: executable_path.into(),
            options,
            active_run: None,
        }
    }

    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut SourceBuffer {
        &mut self.buffer
    }

    /// Text of the output region.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn last_result(&self) -> Option<&ExecutionResult> {
        self.last_result.as_ref()
    }

    pub fn executable_path(&self) -> &str {
        &self.executable_path
    }

    pub fn is_running(&self) -> bool {
        self.active_run.is_some()
    }

    /// Starts compiling the current buffer on a worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A run is already active ([`Error::RunInProgress`])
    /// - The buffer is blank ([`Error::EmptyInput`])
    /// - The executable does not exist ([`Error::ExecutableNotFound`])
    ///
    /// No process is spawned in any of these cases.
    pub fn run(&mut self) -> Result<()> {
        if self.active_run.is_some() {
            return Err(Error::RunInProgress);
        }

        if self.buffer.is_blank() {
            return Err(Error::EmptyInput);
        }

        resolve_executable(&self.executable_path)?;

        self.output.clear();
        self.last_result = None;

        let request = ExecutionRequest::new(self.executable_path.clone(), self.buffer.snapshot());
        info!(
            "Starting run of {} bytes with `{}`",
            request.input_text.len(),
            self.executable_path
        );
        self.active_run = Some(RunHandle::spawn(request, self.options));
        Ok(())
    }

    /// Collects the active run's outcome if it has finished.
    ///
    /// Returns `None` while the run is still going or when nothing is running.
    pub fn poll_run(&mut self) -> Option<Result<()>> {
        let outcome = self.active_run.as_ref()?.try_outcome()?;
        self.active_run = None;
        Some(self.record(outcome))
    }

    /// Blocks until the active run finishes and records its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveRun`] if nothing is running, otherwise the
    /// run's own error.
    pub fn wait_run(&mut self) -> Result<()> {
        let handle = self.active_run.take().ok_or(Error::NoActiveRun)?;
        let outcome = handle.wait();
        self.record(outcome)
    }

    /// Asks the active run to stop; its outcome will be [`Error::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveRun`] if nothing is running.
    pub fn cancel_run(&self) -> Result<()> {
        let handle = self.active_run.as_ref().ok_or(Error::NoActiveRun)?;
        handle.cancel();
        Ok(())
    }

    /// Stores a finished run: results fill the output region, errors are returned.
    pub fn record(&mut self, outcome: Result<ExecutionResult>) -> Result<()> {
        let result = outcome?;
        self.output = render_output(&result);
        self.last_result = Some(result);
        Ok(())
    }

    /// Replaces the buffer with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read; the buffer is unchanged.
    pub fn load_file(&mut self, path: &str) -> Result<()> {
        let text = load_text(path)?;
        self.buffer.set_text(text);
        Ok(())
    }

    /// Saves the buffer to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save_file(&self, path: &str) -> Result<()> {
        save_text(path, self.buffer.text())
    }

    pub fn clear_code(&mut self) {
        self.buffer.clear();
    }

    /// Empties the output region and forgets the last result.
    pub fn clear_output(&mut self) {
        self.output.clear();
        self.last_result = None;
    }

    pub fn insert_sample(&mut self) {
        self.buffer.set_text(SAMPLE_PROGRAM);
    }

    pub fn about(&self) -> String {
        format!(
            "Mini Language Compiler front-end\nFrontend: Rust terminal editor\nBackend: external compiler ({})\n",
            self.executable_path
        )
    }
}
