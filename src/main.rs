//! CLI entry point for the library exporter.

use std::process::ExitCode;

mod app;
mod cli;

use app::ProcessExit;

#[tokio::main]
async fn main() -> ExitCode {
    match app::run().await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}
