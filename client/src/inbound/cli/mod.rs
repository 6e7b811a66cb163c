//! Command-line surface of the `ego-house` binary.
//!
//! Arguments are parsed with clap, executed against borrowed domain
//! services, and rendered to any [`std::io::Write`] sink.

mod args;
mod commands;
mod render;

pub use args::{CatalogCommand, Cli, Command, OrdersCommand};
pub use commands::{CliError, CommandContext, execute};
