//! Integration tests for the interactive editor
//!
//! The editor is driven with scripted input and its terminal output captured
//! in memory.

use mini_ide_cli::editor::input::spawn_line_reader;
use mini_ide_cli::editor::Editor;
use mini_ide_cli::output::OutputStyle;
use mini_ide_core::execution::{ExecutionOptions, ExecutionResult};
use mini_ide_core::session::{EditorSession, SAMPLE_PROGRAM};
use std::io::Cursor;
use tempfile::TempDir;

fn run_editor(executable_path: &str, script: &str) -> (EditorSession, String) {
    let session = EditorSession::new(executable_path, ExecutionOptions::default());
    let input = spawn_line_reader(Cursor::new(script.to_string()));

    let mut editor = Editor::new(session, OutputStyle::default(), Vec::new());
    editor.run(&input).unwrap();

    let (session, output) = editor.into_parts();
    (session, String::from_utf8(output).unwrap())
}

#[test]
fn test_lines_are_appended_to_buffer() {
    let (session, output) = run_editor("missing.bin", "name = \"A\";\nprint name;\n::label\n:show\n");

    assert_eq!(session.buffer().text(), "name = \"A\";\nprint name;\n:label\n");
    assert!(output.contains("print name;\n:label\n"));
}

#[test]
fn test_run_with_empty_buffer_warns() {
    let (session, output) = run_editor("missing.bin", ":run\n");

    assert!(output.contains("No Code"));
    assert!(output.contains("Please write some code before running."));
    assert!(session.last_result().is_none());
}

#[test]
fn test_run_with_missing_executable() {
    let (session, output) = run_editor("missing.bin", "print 1;\n:run\n");

    assert!(output.contains("Executable Not Found"));
    assert!(output.contains("Could not find 'missing.bin' in the current folder."));
    assert!(!session.is_running());
}

#[test]
fn test_sample_clear_and_about() {
    let (session, output) = run_editor("mini.exe", ":sample\n:show\n:about\n:clear\n:show\n");

    assert!(output.contains(SAMPLE_PROGRAM));
    assert!(output.contains("mini.exe"));
    assert!(output.contains("(buffer is empty)"));
    assert!(session.buffer().is_blank());
}

#[test]
fn test_cancel_and_output_without_run() {
    let (_, output) = run_editor("missing.bin", ":cancel\n:output\n");

    assert!(output.contains("No Active Run"));
    assert!(output.contains("(no output)"));
}

#[test]
fn test_output_shows_exit_code_of_silent_run() {
    let mut session = EditorSession::new("missing.bin", ExecutionOptions::default());
    session
        .record(Ok(ExecutionResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 4,
            signal: None,
            launch_failed: false,
        }))
        .unwrap();
    let input = spawn_line_reader(Cursor::new(":output\n:clear-output\n:output\n".to_string()));

    let mut editor = Editor::new(session, OutputStyle::default(), Vec::new());
    editor.run(&input).unwrap();
    let (_, output) = editor.into_parts();
    let output = String::from_utf8(output).unwrap();

    let shown = output.find("[exit code 4]\n").unwrap();
    let cleared = output.find("Output cleared.").unwrap();
    assert!(shown < cleared);
    assert!(!output[..cleared].contains("(no output)"));
    assert!(output[cleared..].contains("(no output)"));
}

#[test]
fn test_unknown_and_incomplete_commands() {
    let (_, output) = run_editor("missing.bin", ":compile\n:open\n");

    assert!(output.contains("Unknown command `:compile`."));
    assert!(output.contains(":run"));
    assert!(output.contains("Usage: :open PATH"));
}

#[test]
fn test_quit_stops_reading() {
    let (session, _) = run_editor("missing.bin", "first;\n:quit\nsecond;\n");
    assert_eq!(session.buffer().text(), "first;\n");
}

#[test]
fn test_save_and_open_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("program.mini");
    let path = path.to_str().unwrap();

    let (_, output) = run_editor(
        "missing.bin",
        &format!("x = \"1\";\n:save {path}\n:clear\n:open {path}\n"),
    );
    assert!(output.contains("Saved"));
    assert!(output.contains("Loaded"));

    let (session, _) = run_editor("missing.bin", &format!(":open {path}\n"));
    assert_eq!(session.buffer().text(), "x = \"1\";\n");
}

#[test]
fn test_open_missing_file_reports_error() {
    let (session, output) = run_editor("missing.bin", "keep;\n:open /this/path/does/not/exist.mini\n");

    assert!(output.contains("Error Opening File"));
    assert_eq!(session.buffer().text(), "keep;\n");
}

#[cfg(unix)]
mod with_compiler {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Mutex, MutexGuard};

    // Tests that write scripts or spawn hold this lock to avoid ETXTBSY races.
    static PROCESS_LOCK: Mutex<()> = Mutex::new(());

    fn lock() -> MutexGuard<'static, ()> {
        PROCESS_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_script(dir: &TempDir, body: &str) -> String {
        let path = dir.path().join("mini.sh");
        {
            let mut file = File::create(&path).unwrap();
            write!(file, "#!/bin/sh\n{body}\n").unwrap();
            file.sync_all().unwrap();
        }
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_run_reports_output_at_end_of_input() {
        let _guard = lock();
        let dir = TempDir::new().unwrap();
        let script = write_script(
            &dir,
            r#"tr -d '\032' | sed -n 's/^.*= *"\([^"]*\)".*$/\1/p'
echo 'note' >&2
exit 2"#,
        );

        let (session, output) = run_editor(&script, "name = \"A\";\nprint name;\n:run\n");

        assert!(output.contains("Running"));
        assert!(output.contains("A\n\n[stderr]\nnote\n[exit code 2]\n"));
        assert_eq!(session.last_result().unwrap().exit_code, 2);
        assert!(!session.is_running());
    }

    #[test]
    fn test_quit_cancels_running_compiler() {
        let _guard = lock();
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exec sleep 30");

        let (session, output) = run_editor(&script, "print 1;\n:run\n:quit\n");

        assert!(output.contains("Run Cancelled"));
        assert!(!session.is_running());
    }

    #[test]
    fn test_second_run_while_busy_is_refused() {
        let _guard = lock();
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "exec sleep 30");

        let (_, output) = run_editor(&script, "print 1;\n:run\n:run\n:cancel\n");

        assert!(output.contains("Run In Progress"));
        assert!(output.contains("Run Cancelled"));
    }
}
