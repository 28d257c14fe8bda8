//! The `eventboard` command-line interface.
//!
//! `eventboard run` authenticates, then republishes the events page until
//! interrupted. The other subcommands exercise one stage at a time.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
