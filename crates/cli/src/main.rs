use std::io::{stderr, stdout};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};
use mini_ide_cli::cli_args::Args;
use mini_ide_cli::editor::{self, input};
use mini_ide_cli::output::{self, OutputStyle};
use mini_ide_core::config::{self, Settings};
use mini_ide_core::error::Result;
use mini_ide_core::execution::ExecutionOptions;
use mini_ide_core::file_handling;
use mini_ide_core::session::{EditorSession, Notification};

/// Load settings and merge them with command-line overrides
fn initialize_session(args: &Args) -> Result<(EditorSession, Settings)> {
    let settings_path = config::get_settings_path(&args.settings_path);
    debug!("Settings path: `{}`", settings_path);

    let settings = file_handling::get_settings(&settings_path)?;
    let executable_path = config::resolve_executable_path(&args.executable, &settings);
    let timeout = match args.timeout_secs {
        Some(timeout_secs) => config::timeout_from_secs(Some(timeout_secs)),
        None => settings.timeout(),
    };
    debug!("Compiler: `{}`, timeout: {:?}", executable_path, timeout);

    let session = EditorSession::new(executable_path, ExecutionOptions::with_timeout(timeout));
    Ok((session, settings))
}

/// Compile the session buffer once and print the result
fn run_once(session: &mut EditorSession, style: &OutputStyle) -> Result<ExitCode> {
    session.run()?;
    session.wait_run()?;

    let Some(result) = session.last_result() else {
        return Ok(ExitCode::FAILURE);
    };

    output::write_streams(&mut stdout(), &mut stderr(), result, style)?;
    Ok(ExitCode::from(output::exit_status_byte(result)))
}

fn report_failure(notification: &Notification) {
    if output::write_notification(&mut stderr(), notification).is_err() {
        eprintln!("{notification}");
    }
}

fn execute() -> Result<ExitCode> {
    let args = Args::parse();
    let (mut session, settings) = initialize_session(&args)?;
    let style = OutputStyle::from_settings(&settings)?;

    if args.sample {
        session.insert_sample();
    } else if let Some(source_path) = &args.source_path {
        if let Err(e) = session.load_file(source_path) {
            report_failure(&Notification::open_failed(&e));
            return Ok(ExitCode::FAILURE);
        }
    }

    if let Some(save_to) = &args.save_to {
        if let Err(e) = session.save_file(save_to) {
            report_failure(&Notification::save_failed(&e));
            return Ok(ExitCode::FAILURE);
        }
        info!("Saved source to `{}`", save_to);
    }

    if args.is_interactive() {
        let input = input::spawn_stdin_reader();
        editor::run_editor(session, style, &input, stdout())?;
        return Ok(ExitCode::SUCCESS);
    }

    run_once(&mut session, &style)
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            report_failure(&Notification::from(&e));
            ExitCode::FAILURE
        }
    }
}
