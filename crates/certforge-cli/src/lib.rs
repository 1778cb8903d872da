//! certforge CLI - Command-line interface library
//!
//! This library provides the CLI functionality for certforge:
//! - Generate: fill the template for every roster record, convert to PDF, zip
//! - Check: validate configuration, roster and template without converting
//!
//! # Binary Usage
//!
//! ```bash
//! # Generate certificates with a blue name
//! certforge generate --template certificado.pptx --roster asistentes.xlsx --color blue
//!
//! # Include the identifier and write to a specific archive
//! certforge generate -t certificado.pptx -r asistentes.csv --with-identifier -o salida.zip
//!
//! # Check inputs before a long run
//! certforge check --template certificado.pptx --roster asistentes.xlsx
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{check_command, generate_command, resolve_config};
pub use app::{run_cli, run_with_args, CheckArgs, GenerateArgs, MissPolicyArg};
