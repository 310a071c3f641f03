//! Bramble - a file-backed blog content engine.

#![allow(dead_code)]

mod blog;
mod cache;
mod cli;
mod config;
mod content;
mod error;
mod logger;
mod post;
mod transform;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::BlogConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = BlogConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Query { args } => cli::query::run_query(args, config),
        Commands::Watch => cli::watch::run_watch(config),
        Commands::Check => cli::check::run_check(config),
    }
}
