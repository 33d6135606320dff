//! `bomtree config` command - Configuration management
//!
//! Shows the effective configuration, where it is read from, and writes a
//! starter project config.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::commands::common::load_config;
use crate::cli::GlobalOpts;
use crate::core::config::PROJECT_CONFIG_FILE;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration as YAML
    Show,

    /// Show paths to configuration files
    Path,

    /// Write an example .bomtree.yaml
    Init,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Init => run_init(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let yaml = serde_yml::to_string(&config).into_diagnostic()?;
    print!("{}", yaml);
    Ok(())
}

fn project_config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE))
}

fn print_path(label: &str, path: &Path) {
    let marker = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not found)").dim()
    };
    println!("{:<8} {} {}", label, path.display(), marker);
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    match Config::global_config_path() {
        Some(path) => print_path("global:", &path),
        None => println!("{:<8} {}", "global:", style("(no home directory)").dim()),
    }
    print_path("project:", &project_config_path(global));
    Ok(())
}

fn run_init(global: &GlobalOpts) -> Result<()> {
    let path = project_config_path(global);
    Config::write_example(&path).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}
