//! Process-execution bridge to the external compiler.
//!
//! The compiler is launched with no arguments and stdin, stdout and stderr
//! redirected to pipes. The program text is written to stdin followed by a
//! single [`END_OF_INPUT`] character, stdin is closed, and both output
//! streams are drained until the child exits.
//!
//! Calls are independent: each invocation owns its own process and pipes and
//! no state is kept between calls, so overlapping invocations from several
//! threads are allowed.

use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{Error, Result};

/// End-of-transmission marker appended to every payload (ASCII SUB, Ctrl+Z).
///
/// The compiler's input parser stops at this character instead of waiting for
/// the pipe to close. A different compiler backend may need a different
/// marker.
pub const END_OF_INPUT: char = '\u{1A}';

const POLL_INTERVAL: Duration = Duration::from_millis(5);
const DRAIN_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub executable_path: String,
    pub input_text: String,
}

impl ExecutionRequest {
    pub fn new(executable_path: impl Into<String>, input_text: impl Into<String>) -> Self {
        Self {
            executable_path: executable_path.into(),
            input_text: input_text.into(),
        }
    }
}

/// Everything the compiler produced for one request.
///
/// A non-zero `exit_code` is ordinary result data, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code, or `-1` when the child was terminated by a signal.
    pub exit_code: i32,
    /// Terminating signal on unix, if any.
    pub signal: Option<i32>,
    /// Always `false` here; launch failures are returned as [`Error::LaunchFailed`].
    pub launch_failed: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && self.signal.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Upper bound on how long to wait for the child. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl ExecutionOptions {
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

/// Cooperative cancellation flag shared between a caller and a running bridge call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builds the bytes sent to the compiler: the source text plus one [`END_OF_INPUT`].
pub fn build_payload(source_text: &str) -> String {
    let mut payload = String::with_capacity(source_text.len() + END_OF_INPUT.len_utf8());
    payload.push_str(source_text);
    payload.push(END_OF_INPUT);
    payload
}

/// Checks that `executable_path` names an existing file and returns the path to spawn.
///
/// Relative paths are anchored to the current directory so that a bare name
/// such as `mini.exe` never falls through to a `PATH` lookup.
///
/// # Errors
///
/// Returns [`Error::ExecutableNotFound`] if no file exists at the path.
pub fn resolve_executable(executable_path: &str) -> Result<PathBuf> {
    let path = Path::new(executable_path);

    if !path.is_file() {
        return Err(Error::executable_not_found(executable_path.to_string()));
    }

    if path.is_relative() && path.components().count() == 1 {
        return Ok(Path::new(".").join(path));
    }

    Ok(path.to_path_buf())
}

/// Runs the compiler at `executable_path` on `source_text` and waits indefinitely.
///
/// # Errors
///
/// See [`execute_request`].
pub fn execute(source_text: &str, executable_path: &str) -> Result<ExecutionResult> {
    execute_request(
        &ExecutionRequest::new(executable_path, source_text),
        &ExecutionOptions::default(),
        &CancelToken::new(),
    )
}

/// Runs one request through the compiler.
///
/// # Errors
///
/// Returns an error if:
/// - The executable does not exist ([`Error::ExecutableNotFound`]); nothing is spawned
/// - The OS refuses to start it ([`Error::LaunchFailed`])
/// - The timeout elapses ([`Error::Timeout`]) or `cancel` is triggered ([`Error::Cancelled`]);
///   the child is killed in both cases
/// - Reading or writing the pipes fails ([`Error::Stdio`])
pub fn execute_request(
    request: &ExecutionRequest,
    options: &ExecutionOptions,
    cancel: &CancelToken,
) -> Result<ExecutionResult> {
    let program = resolve_executable(&request.executable_path)?;
    debug!("Resolved compiler path: `{}`", program.display());

    let mut child = Command::new(&program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::launch_failed(request.executable_path.clone(), e))?;

    info!(
        "Spawned compiler `{}` (pid {})",
        request.executable_path,
        child.id()
    );

    let payload = build_payload(&request.input_text).into_bytes();
    debug!("Writing {} bytes to compiler stdin", payload.len());

    // Each pipe gets its own thread so a child that emits output before
    // consuming its input cannot block us on a full pipe.
    let (sender, receiver) = mpsc::channel();
    let mut pending = 0;

    if let Some(mut stdin) = child.stdin.take() {
        let sender = sender.clone();
        thread::spawn(move || {
            let written = stdin.write_all(&payload).map(|()| Vec::new());
            drop(stdin);
            let _ = sender.send((Pipe::Stdin, written));
        });
        pending += 1;
    }
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(Pipe::Stdout, stdout, sender.clone());
        pending += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(Pipe::Stderr, stderr, sender.clone());
        pending += 1;
    }
    drop(sender);

    // On timeout or cancel the pipe threads are detached, not joined: a
    // grandchild may still hold the write ends open.
    let started = Instant::now();
    let status = wait_for_exit(&mut child, started, options.timeout, cancel)?;
    let (stdout, stderr) = collect_pipes(&receiver, pending, started, options.timeout, cancel)?;

    let result = ExecutionResult {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: status.code().unwrap_or(-1),
        signal: exit_signal(&status),
        launch_failed: false,
    };

    info!(
        "Compiler exited with code {} ({} bytes stdout, {} bytes stderr)",
        result.exit_code,
        stdout.len(),
        stderr.len()
    );

    Ok(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipe {
    Stdin,
    Stdout,
    Stderr,
}

type PipeReport = (Pipe, std::io::Result<Vec<u8>>);

fn spawn_reader<R: Read + Send + 'static>(pipe: Pipe, mut stream: R, sender: Sender<PipeReport>) {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let read = stream.read_to_end(&mut buffer).map(|_| buffer);
        let _ = sender.send((pipe, read));
    });
}

/// Waits for every pipe thread to report, still honouring the deadline and `cancel`.
///
/// The child has already exited here, but a background process it started
/// can keep an output pipe open long after that.
fn collect_pipes(
    receiver: &Receiver<PipeReport>,
    mut pending: usize,
    started: Instant,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    while pending > 0 {
        if cancel.is_cancelled() {
            warn!("Run cancelled while compiler output was still open");
            return Err(Error::Cancelled);
        }

        let wait = match timeout {
            Some(limit) => {
                let remaining = limit.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    warn!("Compiler output still open after {:?}, giving up", limit);
                    return Err(Error::Timeout { after: limit });
                }
                remaining.min(DRAIN_INTERVAL)
            }
            None => DRAIN_INTERVAL,
        };

        match receiver.recv_timeout(wait) {
            Ok((pipe, outcome)) => {
                pending -= 1;
                match (pipe, outcome) {
                    (Pipe::Stdout, Ok(buffer)) => stdout = buffer,
                    (Pipe::Stderr, Ok(buffer)) => stderr = buffer,
                    (Pipe::Stdin, Ok(_)) => {}
                    (Pipe::Stdin, Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                        debug!("Compiler exited before reading all of its input");
                    }
                    (_, Err(e)) => return Err(Error::Stdio(e)),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::Stdio(std::io::Error::other(
                    "pipe thread exited without reporting",
                )));
            }
        }
    }

    Ok((stdout, stderr))
}

fn wait_for_exit(
    child: &mut Child,
    started: Instant,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                terminate(child);
                return Err(Error::Stdio(e));
            }
        }

        if cancel.is_cancelled() {
            warn!("Run cancelled, stopping compiler (pid {})", child.id());
            terminate(child);
            return Err(Error::Cancelled);
        }

        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                warn!(
                    "Compiler (pid {}) still running after {:?}, stopping it",
                    child.id(),
                    limit
                );
                terminate(child);
                return Err(Error::Timeout { after: limit });
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!("Failed to kill compiler (pid {}): {}", child.id(), e);
    }

    if let Err(e) = child.wait() {
        warn!("Failed to reap compiler (pid {}): {}", child.id(), e);
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_payload_appends_single_marker() {
        let payload = build_payload("name = \"A\"; print name;");
        assert_eq!(payload, "name = \"A\"; print name;\u{1A}");
        assert_eq!(payload.matches(END_OF_INPUT).count(), 1);
    }

    #[test]
    fn test_build_payload_keeps_text_verbatim() {
        let source = "  line one\r\n\tline two\n\n";
        let payload = build_payload(source);
        assert_eq!(&payload[..source.len()], source);
        assert!(payload.ends_with(END_OF_INPUT));
        assert_eq!(payload.len(), source.len() + 1);
    }

    #[test]
    fn test_build_payload_utf8_source() {
        let payload = build_payload("print \"héllo ✓\";");
        assert_eq!(payload.as_bytes().last(), Some(&0x1A));
    }

    #[test]
    fn test_end_of_input_is_ascii_sub() {
        assert_eq!(END_OF_INPUT as u32, 0x1A);
    }

    #[test]
    fn test_resolve_executable_missing() {
        let result = resolve_executable("missing.bin");
        assert!(matches!(result, Err(Error::ExecutableNotFound { path }) if path == "missing.bin"));
    }

    #[test]
    fn test_resolve_executable_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let result = resolve_executable(dir.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }

    #[test]
    fn test_resolve_executable_absolute_path_unchanged() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("mini.exe");
        std::fs::write(&file, "").unwrap();

        let resolved = resolve_executable(file.to_str().unwrap()).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn test_execute_missing_executable_does_not_spawn() {
        let result = execute("print 1;", "missing.bin");
        assert!(matches!(result, Err(Error::ExecutableNotFound { .. })));
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_collect_pipes_gives_up_at_deadline() {
        let (_sender, receiver) = mpsc::channel::<PipeReport>();
        let limit = Duration::from_millis(50);

        let result = collect_pipes(&receiver, 1, Instant::now(), Some(limit), &CancelToken::new());

        assert!(matches!(result, Err(Error::Timeout { after }) if after == limit));
    }

    #[test]
    fn test_collect_pipes_stops_on_cancel() {
        let (_sender, receiver) = mpsc::channel::<PipeReport>();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = collect_pipes(&receiver, 1, Instant::now(), None, &cancel);

        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_collect_pipes_sorts_streams_and_ignores_broken_stdin() {
        let (sender, receiver) = mpsc::channel();
        sender
            .send((Pipe::Stdin, Err(std::io::Error::from(ErrorKind::BrokenPipe))))
            .unwrap();
        sender.send((Pipe::Stderr, Ok(b"warn".to_vec()))).unwrap();
        sender.send((Pipe::Stdout, Ok(b"A\n".to_vec()))).unwrap();

        let (stdout, stderr) =
            collect_pipes(&receiver, 3, Instant::now(), None, &CancelToken::new()).unwrap();

        assert_eq!(stdout, b"A\n");
        assert_eq!(stderr, b"warn");
    }

    #[test]
    fn test_collect_pipes_reports_lost_thread() {
        let (sender, receiver) = mpsc::channel::<PipeReport>();
        drop(sender);

        let result = collect_pipes(&receiver, 1, Instant::now(), None, &CancelToken::new());

        assert!(matches!(result, Err(Error::Stdio(_))));
    }

    #[test]
    fn test_result_success() {
        let mut result = ExecutionResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            signal: None,
            launch_failed: false,
        };
        assert!(result.success());
        result.exit_code = 2;
        assert!(!result.success());
    }
}
