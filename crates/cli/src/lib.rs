//! Mini IDE CLI Library
//!
//! This crate provides the terminal front-end for mini-ide. It stands in for a
//! desktop editor: it owns an editor session, hands the program text to the
//! compiler through the core bridge, and shows what the compiler printed.
//!
//! # Key Features
//!
//! - **One-shot Runs**: Compile a file (or the sample program) and print the result
//! - **Interactive Editor**: Build up a program line by line and run it in the background
//! - **Themed Output**: Configurable colors for the stderr section
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`editor`]: Interactive line editor and its command parser
//! - [`output`]: Rendering of results and notifications
//! - [`colors`]: Conversion of settings colors to terminal colors
//!
//! # Examples
//!
//! ```bash
//! # Run a program once with ./mini.exe
//! mini-ide hello.mini
//!
//! # Use a different compiler and give up after 5 seconds
//! mini-ide -e ./build/mini -t 5 hello.mini
//!
//! # Run the bundled sample program
//! mini-ide --sample
//!
//! # Interactive editor
//! mini-ide
//! ```

pub mod cli_args;
pub mod colors;
pub mod editor;
pub mod output;
