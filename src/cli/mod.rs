//! Command-line interface module.

mod args;
pub mod check;
pub mod query;
pub mod watch;

pub use args::{Cli, Commands, QueryArgs};
