//! `bomtree analyze` command - classify parts and write the report

use chrono::Local;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::commands::common::{
    load_config, load_session, parse_delimiter, selected_labels, write_output, SelectArgs,
    SourceArgs,
};
use crate::cli::GlobalOpts;
use crate::core::parts::{dedup_parts, read_part_file, PartFileOptions};
use crate::core::{AnalysisError, AnalysisSummary, Config, PartStatus, ProgressEvent};
use crate::render::{render, RenderOptions, ReportFormat};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Part numbers to analyze
    pub parts: Vec<String>,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub selection: SelectArgs,

    /// Read part numbers from a delimited file or workbook (repeatable)
    #[arg(long = "parts-file", value_name = "FILE")]
    pub parts_files: Vec<PathBuf>,

    /// 1-based column of the part numbers in --parts-file
    #[arg(long = "parts-column", value_name = "N", default_value_t = 3)]
    pub parts_column: usize,

    /// Field delimiter of --parts-file (default: detected)
    #[arg(long = "parts-delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub parts_delimiter: Option<u8>,

    /// Skip the first row of --parts-file
    #[arg(long = "parts-header")]
    pub parts_header: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o', conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Save to a timestamped file in the current directory
    #[arg(long)]
    pub save: bool,

    /// Report format (default: from the output extension, then config)
    #[arg(long, short = 'f', value_enum)]
    pub format: Option<ReportFormat>,

    /// Classify parts on all cores
    #[arg(long)]
    pub parallel: bool,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let parts = collect_parts(&args)?;
    if parts.is_empty() {
        return Err(AnalysisError::NoParts.into());
    }

    let session = load_session(&args.sources, &config, global)?;
    let labels = selected_labels(&args.selection, &session)?;
    let searched: Vec<String> = session
        .select(&labels)?
        .iter()
        .map(|t| t.source_id().to_string())
        .collect();

    let format = resolve_format(args.format, args.output.as_deref(), &config)?;

    if !global.quiet {
        eprintln!(
            "Analyzing {} part(s) in {}",
            style(parts.len()).bold(),
            searched.join(", ")
        );
    }

    let quiet = global.quiet;
    let observer = move |event: &ProgressEvent| {
        if quiet {
            return;
        }
        if let ProgressEvent::PartFinished {
            position,
            total,
            part,
            status,
            node_count,
        } = event
        {
            let status_text = match status {
                PartStatus::BomFound => style(format!("{} ({} components)", status, node_count)).green(),
                PartStatus::ComponentOnly => style(status.to_string()).yellow(),
                PartStatus::NotFound => style(status.to_string()).red(),
            };
            eprintln!("  [{}/{}] {} {}", position, total, part, status_text);
        }
    };

    let model = session.analyze(&parts, &labels, args.parallel, &observer)?;

    let options = RenderOptions {
        link_template: config.link_template.clone(),
    };
    let content = render(&model, format, &options).into_diagnostic()?;

    let output_path = match args.output {
        Some(path) => Some(path),
        None if args.save => Some(timestamped_path(format)),
        None => None,
    };
    write_output(&content, output_path.as_ref(), global)?;

    if !global.quiet {
        print_summary(&searched, &model.summary());
    }

    Ok(())
}

/// Positional parts followed by every parts file, deduplicated
fn collect_parts(args: &AnalyzeArgs) -> Result<Vec<String>> {
    let mut parts = args.parts.clone();

    let options = PartFileOptions {
        column: args.parts_column,
        delimiter: args.parts_delimiter,
        has_header: args.parts_header,
    };
    for path in &args.parts_files {
        let from_file = read_part_file(path, &options).into_diagnostic()?;
        tracing::debug!(file = %path.display(), count = from_file.len(), "read part list");
        parts.extend(from_file);
    }

    Ok(dedup_parts(parts))
}

/// `--format`, then the output extension, then the configured default
fn resolve_format(
    explicit: Option<ReportFormat>,
    output: Option<&Path>,
    config: &Config,
) -> Result<ReportFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    if let Some(format) = output.and_then(ReportFormat::from_path) {
        return Ok(format);
    }
    match config.default_format.as_deref() {
        Some(name) => ReportFormat::parse(name).ok_or_else(|| {
            miette::miette!(
                help = "use one of: md, json, yaml, csv, html",
                "unknown default_format '{}' in config",
                name
            )
        }),
        None => Ok(ReportFormat::default()),
    }
}

fn timestamped_path(format: ReportFormat) -> PathBuf {
    PathBuf::from(format!(
        "bom_analysis_report_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

fn print_summary(searched: &[String], summary: &AnalysisSummary) {
    eprintln!();
    eprintln!("{}", style("Summary").bold().underlined());
    eprintln!("  Searched sources: {}", searched.join(", "));
    eprintln!("  Total parts:      {}", summary.total);
    eprintln!("  BOM found:        {}", style(summary.bom_found).green());
    eprintln!("  Component only:   {}", style(summary.component_only).yellow());
    eprintln!("  No BOM found:     {}", style(summary.not_found).red());
}
