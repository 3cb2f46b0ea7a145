use std::io::{stdin, BufRead, BufReader};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use log::debug;

#[derive(Debug)]
pub enum InputEvent {
    Line(String),
    Eof,
    Failed(std::io::Error),
}

/// Reads lines from `reader` on a background thread.
///
/// The receiver yields each line without its terminator, then one
/// [`InputEvent::Eof`] or [`InputEvent::Failed`].
pub fn spawn_line_reader<R: BufRead + Send + 'static>(reader: R) -> Receiver<InputEvent> {
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        for line in reader.lines() {
            let event = match line {
                Ok(line) => InputEvent::Line(line),
                Err(e) => {
                    let _ = sender.send(InputEvent::Failed(e));
                    return;
                }
            };

            if sender.send(event).is_err() {
                debug!("Editor stopped listening for input");
                return;
            }
        }

        let _ = sender.send(InputEvent::Eof);
    });

    receiver
}

pub fn spawn_stdin_reader() -> Receiver<InputEvent> {
    spawn_line_reader(BufReader::new(stdin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lines_then_eof() {
        let receiver = spawn_line_reader(Cursor::new("print 1;\r\n:run\n"));

        assert!(matches!(receiver.recv().unwrap(), InputEvent::Line(l) if l == "print 1;"));
        assert!(matches!(receiver.recv().unwrap(), InputEvent::Line(l) if l == ":run"));
        assert!(matches!(receiver.recv().unwrap(), InputEvent::Eof));
    }

    #[test]
    fn test_invalid_utf8_reports_failure() {
        let receiver = spawn_line_reader(Cursor::new(vec![0xff, 0xfe, b'\n']));
        assert!(matches!(receiver.recv().unwrap(), InputEvent::Failed(_)));
    }
}
