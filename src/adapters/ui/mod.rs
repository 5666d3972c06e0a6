//! Terminal presentation: command line, prompts, progress and output rendering.

pub mod cli;
pub mod dispatch;
pub mod progress;
pub mod prompt;
pub mod render;
pub mod views;

pub use cli::Cli;
pub use dispatch::CliInputPort;
pub use render::OutputFormat;
