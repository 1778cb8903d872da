//! certforge CLI binary entry point
//!
//! Installs the log subscriber, then calls the library's `run_cli()`.

use anyhow::Result;
use certforge_cli::run_cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli()
}
