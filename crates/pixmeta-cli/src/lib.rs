pub mod cli;
pub mod config;
pub mod inputs;
pub mod output;
pub mod progress;

pub use cli::{Cli, Commands, ConfigCommands, OutputMode};
pub use config::Config;
pub use inputs::collect_inputs;
pub use output::OutputFormatter;
pub use progress::ProgressReporter;
