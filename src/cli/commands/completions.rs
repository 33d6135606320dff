//! `bomtree completions` command
//!
//! Prints a completion script that knows the `analyze`, `tree`, `sources`
//! and `config` subcommands along with flags such as `--bom`, `--select`
//! and `--format` (including its `md|json|yaml|csv|html` values).
//!
//! ```bash
//! bomtree completions zsh > "${fpath[1]}/_bomtree"
//! bomtree completions powershell | Out-String | Invoke-Expression
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the script for the requested shell to stdout
pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "bomtree", &mut io::stdout());
    Ok(())
}
