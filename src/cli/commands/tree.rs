//! `bomtree tree` command - print one part's component tree

use console::style;
use miette::Result;

use crate::cli::commands::common::{load_config, load_session, selected_labels, SelectArgs, SourceArgs};
use crate::cli::GlobalOpts;
use crate::core::{classify, PartResult, TreeNode};

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Part number to expand
    pub part: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub selection: SelectArgs,
}

pub fn run(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let session = load_session(&args.sources, &config, global)?;
    let labels = selected_labels(&args.selection, &session)?;
    let indices = session.indices(&labels)?;

    let part = args.part.trim();
    match classify(part, &indices) {
        PartResult::HasBom(nodes) => {
            let name = session.combined().display_name(part).unwrap_or_default();
            if name.is_empty() {
                println!("{}", style(part).bold());
            } else {
                println!("{} {}", style(part).bold(), style(name).dim());
            }

            for (prefix, node) in branch_prefixes(&nodes).iter().zip(&nodes) {
                let mut line = format!("{}{}", prefix, style(&node.part).cyan());
                if !node.name.is_empty() {
                    line.push_str(&format!("  {}", node.name));
                }
                line.push_str(&format!(" {}", style(format!("[{}]", node.source)).dim()));
                println!("{}", line);
            }

            if !global.quiet {
                eprintln!("{} component(s)", nodes.len());
            }
        }
        PartResult::ComponentOnly(record) => {
            println!(
                "{}: {} - {} {}",
                style(part).bold(),
                style("Component Only").yellow(),
                if record.description.is_empty() {
                    record.name.clone()
                } else {
                    format!("{} ({})", record.name, record.description)
                },
                style(format!("[{}]", record.source)).dim()
            );
        }
        PartResult::NotFound => {
            println!("{}: {}", style(part).bold(), style("No BOM Found").red());
        }
    }

    Ok(())
}

/// Box-drawing prefix for every node of a pre-order listing
fn branch_prefixes(nodes: &[TreeNode]) -> Vec<String> {
    // A node has a later sibling when another node at its depth follows
    // before any shallower node does.
    let mut has_later = vec![false; nodes.len()];
    let mut seen: Vec<bool> = Vec::new();
    for (i, node) in nodes.iter().enumerate().rev() {
        has_later[i] = seen.get(node.depth).copied().unwrap_or(false);
        seen.resize(node.depth + 1, false);
        seen[node.depth] = true;
    }

    let mut open: Vec<bool> = Vec::new();
    let mut prefixes = Vec::with_capacity(nodes.len());
    for (node, &later) in nodes.iter().zip(&has_later) {
        open.truncate(node.depth);
        let mut prefix: String = open
            .iter()
            .map(|&o| if o { "│  " } else { "   " })
            .collect();
        prefix.push_str(if later { "├─ " } else { "└─ " });
        prefixes.push(prefix);
        open.push(later);
    }
    prefixes
}
