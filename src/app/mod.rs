mod config_file;
mod config_runtime;
mod exit_handler;
mod progress;
mod runtime;
mod terminal;

pub(crate) use exit_handler::ProcessExit;
pub(crate) use runtime::run;
