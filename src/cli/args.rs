//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, config::ConfigCommands,
    sources::SourcesArgs, tree::TreeArgs,
};

#[derive(Parser)]
#[command(name = "bomtree")]
#[command(author, version, about = "BOM tree expansion and multi-source analysis")]
#[command(long_about = "Expands part numbers into indented component trees across one or more \
flat BOM exports and reports, per part, whether a BOM was found, the part only appears as a \
component, or it is unknown.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file to use instead of ./.bomtree.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze part numbers and write a report
    Analyze(AnalyzeArgs),

    /// Print the component tree of one part
    Tree(TreeArgs),

    /// List loaded BOM sources
    Sources(SourcesArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
