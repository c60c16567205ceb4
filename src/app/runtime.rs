use std::io::IsTerminal;

use anyhow::Result;
use exporter_core::{Credentials, Exporter};
use tracing::{debug, error, info};

use super::config_file::load_default_file_config;
use super::config_runtime::{
    apply_config_defaults, build_export_request, parse_cli_with_sources, resolve_default_log_level,
    resolve_endpoints, resolve_http_settings, should_force_cli_log_level,
};
use super::exit_handler::{ProcessExit, determine_exit_outcome};
use super::progress::progress_observer;
use super::terminal::{init_tracing, is_dumb_terminal, is_no_color_requested, should_show_progress};

pub(crate) async fn run() -> Result<ProcessExit> {
    let (args, cli_sources) = parse_cli_with_sources();
    let file_config = load_default_file_config()?;
    let args = apply_config_defaults(args, &cli_sources, file_config.as_ref());

    init_tracing(
        resolve_default_log_level(&args),
        should_force_cli_log_level(&cli_sources),
        is_no_color_requested(args.no_color),
    );
    debug!(
        email = %args.email,
        config_loaded = file_config.is_some(),
        "arguments resolved"
    );

    let endpoints = resolve_endpoints(&args)?;
    let request = build_export_request(&args);
    let settings = resolve_http_settings(file_config.as_ref());
    let credentials = Credentials::new(args.email.clone(), args.password.clone());
    let show_progress = should_show_progress(
        std::io::stderr().is_terminal(),
        args.quiet,
        is_dumb_terminal(),
    );

    let exporter = Exporter::new(endpoints, credentials, settings)?
        .with_progress(progress_observer(show_progress));

    match exporter.run(&request).await {
        Ok(stats) => {
            let outcome = determine_exit_outcome(&stats);
            info!(
                downloaded = stats.downloaded(),
                skipped = stats.skipped(),
                failed = stats.failed(),
                "done"
            );
            Ok(outcome)
        }
        Err(err) => {
            error!(error = %err, "export aborted");
            Ok(ProcessExit::Failure)
        }
    }
}
