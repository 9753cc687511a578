pub mod commands;
mod completion;
pub mod core;
pub mod output;
mod shell;

pub use self::core::{Backend, CliError, CliMode, CliOptions};
pub use shell::run_cli;
