//! File configuration for CLI defaults.
//!
//! A flat `key = value` subset of TOML read from
//! `$XDG_CONFIG_HOME/library-exporter/config.toml`. Credentials are never
//! read from here.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use exporter_core::{FileFormat, MAX_CONCURRENCY};

const CONFIG_DIR_NAME: &str = "library-exporter";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Defaults loaded from the config file. Command-line values win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    /// Output directory.
    pub(crate) output_dir: Option<PathBuf>,
    /// File types to download.
    pub(crate) file_types: Option<Vec<FileFormat>>,
    /// Items processed at once.
    pub(crate) concurrency: Option<u8>,
    /// Verbosity mode.
    pub(crate) verbosity: Option<VerbositySetting>,
    /// Listing sort order.
    pub(crate) order: Option<String>,
    /// Service base URL.
    pub(crate) api_base_url: Option<String>,
    /// Static content base URL.
    pub(crate) static_base_url: Option<String>,
    /// Connect timeout in seconds.
    pub(crate) connect_timeout_secs: Option<u64>,
    /// Read timeout in seconds.
    pub(crate) read_timeout_secs: Option<u64>,
    /// Table of contents in summaries.
    pub(crate) toc: Option<bool>,
    /// Review rating in summaries.
    pub(crate) reviews: Option<bool>,
    /// Author biographies in summaries.
    pub(crate) author_bios: Option<bool>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=MAX_CONCURRENCY).contains(&usize::from(concurrency))
        {
            bail!(
                "Invalid config value for `concurrency`: {concurrency}. Expected range: 1..={MAX_CONCURRENCY}"
            );
        }
        if let Some(file_types) = &self.file_types
            && file_types.is_empty()
        {
            bail!("Invalid config value for `file_types`: expected at least one type");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/library-exporter/config.toml`
/// 2. `$HOME/.config/library-exporter/config.toml`
#[must_use]
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    let config_home = match non_empty_env("XDG_CONFIG_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(non_empty_env("HOME")?).join(".config"),
    };
    Some(config_home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty_env(name: &str) -> Option<std::ffi::OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads the config from the default path; `None` when there is no file.
pub(crate) fn load_default_file_config() -> Result<Option<FileConfig>> {
    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    load_file_config(&path).map(Some)
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {}", line_index + 1);

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "file_types" => {
                cfg.file_types = Some(parse_file_types(value).with_context(context)?);
            }
            "concurrency" => {
                cfg.concurrency = Some(parse_integer(value).with_context(context)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(context)?);
            }
            "order" => {
                cfg.order = Some(parse_string_literal(value).with_context(context)?);
            }
            "api_base_url" => {
                cfg.api_base_url = Some(parse_string_literal(value).with_context(context)?);
            }
            "static_base_url" => {
                cfg.static_base_url = Some(parse_string_literal(value).with_context(context)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer(value).with_context(context)?);
            }
            "toc" => cfg.toc = Some(parse_boolean(value).with_context(context)?),
            "reviews" => cfg.reviews = Some(parse_boolean(value).with_context(context)?),
            "author_bios" => cfg.author_bios = Some(parse_boolean(value).with_context(context)?),
            "email" | "password" => {
                bail!(
                    "Credentials are not read from the config file (line {}); use --email/--password or the environment",
                    line_index + 1
                );
            }
            unknown => {
                bail!(
                    "Unknown configuration key: '{}' on line {}",
                    unknown,
                    line_index + 1
                );
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Expected double-quoted string"))
}

/// `["pdf", "epub"]` or a single `"pdf"`.
fn parse_file_types(raw_value: &str) -> Result<Vec<FileFormat>> {
    let inner = match raw_value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => inner,
        None => raw_value,
    };
    inner
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            let name = parse_string_literal(token)?;
            name.parse::<FileFormat>().map_err(anyhow::Error::from)
        })
        .collect()
}

/// Non-negative integer narrowed to the field's type.
fn parse_integer<T: TryFrom<u64>>(raw_value: &str) -> Result<T> {
    let value: u64 = raw_value
        .trim()
        .parse()
        .context("Expected a non-negative integer")?;
    T::try_from(value).map_err(|_| anyhow!("Integer {value} is out of range"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    raw_value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Expected 'true' or 'false'"))
}
