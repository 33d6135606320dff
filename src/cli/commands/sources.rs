//! `bomtree sources` command - list loaded BOM sources

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::common::{load_config, load_session, SourceArgs};
use crate::cli::GlobalOpts;
use crate::core::Session;

#[derive(clap::Args, Debug)]
pub struct SourcesArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "table")]
    pub format: SourcesFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourcesFormat {
    #[default]
    Table,
    Json,
}

#[derive(Serialize)]
struct SourceInfo<'a> {
    label: &'a str,
    rows: usize,
    assemblies: usize,
    components: usize,
}

#[derive(Serialize)]
struct LoadFailure {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct SourcesReport<'a> {
    sources: Vec<SourceInfo<'a>>,
    errors: Vec<LoadFailure>,
    combined_relationships: usize,
}

impl<'a> SourcesReport<'a> {
    fn new(session: &'a Session) -> Self {
        Self {
            sources: session
                .tables()
                .iter()
                .map(|t| SourceInfo {
                    label: t.source_id(),
                    rows: t.len(),
                    assemblies: t.assembly_count(),
                    components: t.component_count(),
                })
                .collect(),
            errors: session
                .load_errors()
                .iter()
                .map(|e| LoadFailure {
                    path: e.path().display().to_string(),
                    error: e.to_string(),
                })
                .collect(),
            combined_relationships: session.combined().len(),
        }
    }

    fn to_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Source", "Rows", "Assemblies", "Components"]);
        for s in &self.sources {
            builder.push_record([
                s.label.to_string(),
                s.rows.to_string(),
                s.assemblies.to_string(),
                s.components.to_string(),
            ]);
        }
        builder.build().with(Style::markdown()).to_string()
    }
}

pub fn run(args: SourcesArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    // Loaded-file lines would duplicate the table; load errors still print
    let listing = GlobalOpts {
        quiet: true,
        ..global.clone()
    };
    let session = load_session(&args.sources, &config, &listing)?;
    let report = SourcesReport::new(&session);

    match args.format {
        SourcesFormat::Json => {
            let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{}", json);
        }
        SourcesFormat::Table => {
            println!("{}", report.to_table());
            if !report.errors.is_empty() {
                println!();
                println!("{} file(s) failed to load", style(report.errors.len()).red().bold());
            }
            println!();
            println!(
                "{} sources → {} unique relationships",
                style(report.sources.len()).bold(),
                style(report.combined_relationships).bold()
            );
        }
    }

    Ok(())
}
