/// Prefix marking a line as an editor command rather than program text.
pub const COMMAND_PREFIX: char = ':';

pub const HELP_TEXT: &str = "\
Type program lines to append them to the buffer.
Commands:
  :run            compile and run the buffer
  :cancel         stop the running compiler
  :show           print the buffer
  :output         print the last output
  :clear          clear the buffer
  :clear-output   clear the output
  :open PATH      replace the buffer with a file
  :save PATH      save the buffer to a file
  :sample         insert the sample program
  :about          about this editor
  :help           show this help
  :quit           leave the editor
Start a line with `::` to append a line beginning with `:`.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Append(String),
    Run,
    Cancel,
    Show,
    ShowOutput,
    ClearCode,
    ClearOutput,
    Open(String),
    Save(String),
    Sample,
    About,
    Help,
    Quit,
    MissingPath(&'static str),
    Unknown(String),
}

/// Interprets one line typed into the editor.
pub fn parse_line(line: &str) -> EditorCommand {
    let Some(command_line) = line.strip_prefix(COMMAND_PREFIX) else {
        return EditorCommand::Append(line.to_string());
    };

    if command_line.starts_with(COMMAND_PREFIX) {
        return EditorCommand::Append(command_line.to_string());
    }

    let command_line = command_line.trim();
    let (name, argument) = match command_line.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command_line, ""),
    };

    match name {
        "run" => EditorCommand::Run,
        "cancel" => EditorCommand::Cancel,
        "show" => EditorCommand::Show,
        "output" => EditorCommand::ShowOutput,
        "clear" => EditorCommand::ClearCode,
        "clear-output" => EditorCommand::ClearOutput,
        "open" => path_command(argument, "open", EditorCommand::Open),
        "save" => path_command(argument, "save", EditorCommand::Save),
        "sample" => EditorCommand::Sample,
        "about" => EditorCommand::About,
        "help" => EditorCommand::Help,
        "quit" | "q" => EditorCommand::Quit,
        _ => EditorCommand::Unknown(command_line.to_string()),
    }
}

fn path_command(
    argument: &str,
    name: &'static str,
    build: fn(String) -> EditorCommand,
) -> EditorCommand {
    if argument.is_empty() {
        EditorCommand::MissingPath(name)
    } else {
        build(argument.to_string())
    }
}
