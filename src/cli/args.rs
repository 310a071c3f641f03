//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Bramble blog content engine CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: bramble.toml)
    #[arg(short = 'C', long, default_value = "bramble.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Query posts as JSON
    #[command(visible_alias = "q")]
    Query {
        #[command(flatten)]
        args: QueryArgs,
    },

    /// Load the content tree and keep it fresh on change
    #[command(visible_alias = "w")]
    Watch,

    /// Parse all content once and report problems
    #[command(visible_alias = "c")]
    Check,
}

/// Query command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    /// List one group (e.g. drafts) instead of dated posts
    #[arg(short, long)]
    pub group: Option<String>,

    /// One page of dated posts, counted from 0
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Single dated post by slug
    #[arg(short, long)]
    pub slug: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}
