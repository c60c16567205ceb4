//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use exporter_core::{FileFormat, MAX_CONCURRENCY, PROVIDER_PAGE_SIZE};

/// Export the items your account owns to a local directory.
///
/// Logs in, lists your library (or takes explicit ids), and downloads each
/// requested file type that the item offers. Files already on disk are
/// skipped, so an interrupted run can simply be repeated.
#[derive(Parser, Debug)]
#[command(name = "library-exporter")]
#[command(author, version, about)]
pub struct Args {
    /// Account email
    #[arg(short = 'e', long, env = "LIBRARY_EXPORTER_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(short = 'p', long, env = "LIBRARY_EXPORTER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Directory to save items into (default: current directory)
    #[arg(short = 'd', long)]
    pub directory: Option<PathBuf>,

    /// File types to download: pdf, epub, mobi, code (default: pdf)
    #[arg(
        short = 'b',
        long = "book-file-types",
        value_delimiter = ',',
        num_args = 1..,
        value_parser = parse_format
    )]
    pub book_file_types: Vec<FileFormat>,

    /// Export only these item ids instead of listing the library
    #[arg(short = 'i', long, value_delimiter = ',', num_args = 1..)]
    pub ids: Vec<String>,

    /// Position of the first listed item
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Maximum number of listed items (default: all)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Items requested per listing page (1-25)
    #[arg(long, default_value_t = PROVIDER_PAGE_SIZE as u8, value_parser = clap::value_parser!(u8).range(1..=PROVIDER_PAGE_SIZE as i64))]
    pub page_size: u8,

    /// Listing sort order (default: createdAt:DESC)
    #[arg(long)]
    pub order: Option<String>,

    /// Put every item in its own subdirectory
    #[arg(short = 's', long)]
    pub separate: bool,

    /// Write a Markdown summary per item
    #[arg(long)]
    pub summary: bool,

    /// Write summaries as README.md inside the item directory (needs --separate)
    #[arg(long)]
    pub separate_summaries: bool,

    /// Leave the table of contents out of summaries
    #[arg(long)]
    pub no_toc: bool,

    /// Include the review rating in summaries
    #[arg(long)]
    pub reviews: bool,

    /// Include author biographies in summaries
    #[arg(long)]
    pub author_bios: bool,

    /// Items processed at once (1-8)
    #[arg(short = 'c', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=MAX_CONCURRENCY as i64))]
    pub concurrency: u8,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Override the service base URL
    #[arg(long, hide = true)]
    pub api_base_url: Option<String>,

    /// Override the static content base URL
    #[arg(long, hide = true)]
    pub static_base_url: Option<String>,
}

fn parse_format(value: &str) -> Result<FileFormat, String> {
    value.parse::<FileFormat>().map_err(|err| err.to_string())
}
