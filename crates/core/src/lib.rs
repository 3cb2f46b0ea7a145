//! Mini IDE Core Library
//!
//! This crate provides the core functionality for mini-ide, a front-end that
//! writes, loads, saves and runs programs in a small teaching language by
//! handing them to an external, pre-built compiler executable.
//!
//! # Key Features
//!
//! - **Execution Bridge**: Spawn the compiler, pipe in the program text with an
//!   end-of-input marker, and capture stdout, stderr and the exit code
//! - **Timeouts and Cancellation**: Optional bounded waits and cooperative cancel
//! - **Editor Session**: Source buffer, output region and background runs
//! - **File Handling**: Whole-file UTF-8 load and save
//! - **Configuration Management**: Optional YAML settings and path resolution
//! - **Error Handling**: One error type covering every failure mode
//!
//! # Examples
//!
//! Running a program through the compiler:
//!
//! ```no_run
//! use mini_ide_core::execution::execute;
//!
//! let result = execute("name = \"A\"; print name;", "mini.exe")?;
//! println!("{}", result.stdout);
//! println!("exit code: {}", result.exit_code);
//! # Ok::<(), mini_ide_core::error::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod session;
