//! Merges command-line arguments with file configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use exporter_core::endpoints::{DEFAULT_API_BASE_URL, DEFAULT_ORDER, DEFAULT_STATIC_BASE_URL};
use exporter_core::{
    ApiEndpoints, ExportMode, ExportRequest, FileFormat, HttpSettings, ListRequest,
    SummaryLookups, SummaryOptions,
};

use super::config_file::{FileConfig, VerbositySetting};
use crate::cli::Args;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) concurrency: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let sources = CliValueSources {
        concurrency: is_commandline_value(&matches, "concurrency"),
        verbose: is_commandline_value(&matches, "verbose"),
        quiet: is_commandline_value(&matches, "quiet"),
    };
    (args, sources)
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills values the command line left unset from the config file.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Args {
    let Some(file_config) = file_config else {
        return args;
    };

    if args.directory.is_none()
        && let Some(output_dir) = &file_config.output_dir
    {
        args.directory = Some(output_dir.clone());
    }
    if args.book_file_types.is_empty()
        && let Some(file_types) = &file_config.file_types
    {
        args.book_file_types.clone_from(file_types);
    }
    if !cli_sources.concurrency
        && let Some(concurrency) = file_config.concurrency
    {
        args.concurrency = concurrency;
    }
    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.verbosity
    {
        apply_config_verbosity(&mut args, verbosity);
    }
    if args.order.is_none() {
        args.order.clone_from(&file_config.order);
    }
    if args.api_base_url.is_none() {
        args.api_base_url.clone_from(&file_config.api_base_url);
    }
    if args.static_base_url.is_none() {
        args.static_base_url.clone_from(&file_config.static_base_url);
    }
    if !args.no_toc && file_config.toc == Some(false) {
        args.no_toc = true;
    }
    if !args.reviews && file_config.reviews == Some(true) {
        args.reviews = true;
    }
    if !args.author_bios && file_config.author_bios == Some(true) {
        args.author_bios = true;
    }
    args
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    let (quiet, verbose) = match verbosity {
        VerbositySetting::Default => (false, 0),
        VerbositySetting::Verbose => (false, 1),
        VerbositySetting::Quiet => (true, 0),
        VerbositySetting::Debug => (false, 2),
    };
    args.quiet = quiet;
    args.verbose = verbose;
}

pub(crate) fn resolve_http_settings(file_config: Option<&FileConfig>) -> HttpSettings {
    let mut settings = HttpSettings::default();
    let Some(file_config) = file_config else {
        return settings;
    };
    if let Some(value) = file_config.connect_timeout_secs {
        settings.connect_timeout_secs = value;
    }
    if let Some(value) = file_config.read_timeout_secs {
        settings.read_timeout_secs = value;
    }
    settings
}

pub(crate) fn resolve_endpoints(args: &Args) -> Result<ApiEndpoints> {
    let api = args.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
    let static_base = args
        .static_base_url
        .as_deref()
        .unwrap_or(DEFAULT_STATIC_BASE_URL);
    ApiEndpoints::new(api, static_base).context("Invalid base URL override")
}

/// Builds the export request from merged arguments.
pub(crate) fn build_export_request(args: &Args) -> ExportRequest {
    let formats = if args.book_file_types.is_empty() {
        vec![FileFormat::Pdf]
    } else {
        args.book_file_types.clone()
    };
    let mode = if args.ids.is_empty() {
        ExportMode::Catalog(ListRequest {
            offset: args.offset,
            limit: args.limit,
            order: args
                .order
                .clone()
                .unwrap_or_else(|| DEFAULT_ORDER.to_string()),
            page_size: usize::from(args.page_size),
        })
    } else {
        ExportMode::Ids(args.ids.clone())
    };

    ExportRequest {
        output_dir: args
            .directory
            .as_deref()
            .map_or_else(|| PathBuf::from("."), expand_home),
        formats,
        mode,
        separate: args.separate,
        summary: SummaryOptions {
            enabled: args.summary || args.separate_summaries,
            separate: args.separate_summaries,
            lookups: SummaryLookups {
                toc: !args.no_toc,
                reviews: args.reviews,
                authors: args.author_bios,
            },
        },
        concurrency: usize::from(args.concurrency),
    }
}

/// Expands a leading `~` to `$HOME`.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}
