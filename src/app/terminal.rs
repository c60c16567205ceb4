//! Terminal capability checks and log subscriber setup.

use tracing_subscriber::EnvFilter;

fn env_flag_set(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// `--no-color`, a non-empty `NO_COLOR`, or `TERM=dumb` each turn ANSI off.
pub(crate) fn color_disabled(flag: bool, no_color_env: bool, dumb_terminal: bool) -> bool {
    flag || no_color_env || dumb_terminal
}

pub(crate) fn is_no_color_requested(flag: bool) -> bool {
    color_disabled(flag, env_flag_set("NO_COLOR"), is_dumb_terminal())
}

/// Progress bars need an interactive stderr that is not silenced.
pub(crate) fn should_show_progress(stderr_tty: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_tty && !quiet && !dumb_terminal
}

/// Installs the stderr subscriber.
///
/// `RUST_LOG` wins unless the level was given explicitly on the command line.
pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool, no_color: bool) {
    let filter = if force_cli_level {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    // A subscriber may already be set when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}
