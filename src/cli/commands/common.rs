//! Source loading and selection shared by the analysis commands

use console::style;
use dialoguer::{theme::ColorfulTheme, MultiSelect};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::loader::{find_source_files, load_sources};
use crate::core::{AnalysisError, Config, LoadOptions, Session};

/// Where BOM sources come from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// BOM file to load (repeatable)
    #[arg(long = "bom", short = 'b', value_name = "PATH")]
    pub boms: Vec<PathBuf>,

    /// Preset source from the config file (repeatable)
    #[arg(long = "preset", short = 'p', value_name = "LABEL")]
    pub presets: Vec<String>,

    /// Load every .csv/.tsv/.txt/.xlsx/.xls file under a directory (repeatable)
    #[arg(long = "dir", short = 'd', value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Field delimiter of the BOM files (default: detected from the header)
    #[arg(long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

/// Which loaded sources to search
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Search only this source (repeatable, searched in the order given)
    #[arg(long = "select", short = 's', value_name = "LABEL")]
    pub select: Vec<String>,

    /// Choose the sources to search interactively
    #[arg(long, conflicts_with = "select")]
    pub pick: bool,
}

/// Parse a delimiter argument: a single ASCII character, `tab` or `\t`
pub fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("'{}' is not a single ASCII character", s)),
            }
        }
    }
}

/// Load the layered configuration
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::load(global.config.as_deref()).into_diagnostic()
}

/// Resolve presets, files and directories to paths, in load order
pub fn source_paths(args: &SourceArgs, config: &Config) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for label in &args.presets {
        let preset = config.preset(label).ok_or_else(|| {
            let known: Vec<&str> = config.sources.iter().map(|s| s.label.as_str()).collect();
            miette::miette!(
                help = if known.is_empty() {
                    "no presets are configured".to_string()
                } else {
                    format!("configured presets: {}", known.join(", "))
                },
                "unknown preset '{}'",
                label
            )
        })?;
        paths.push(preset.path.clone());
    }

    paths.extend(args.boms.iter().cloned());

    for dir in &args.dirs {
        paths.extend(find_source_files(dir).into_diagnostic()?);
    }

    Ok(paths)
}

/// Load every source, reporting each file on stderr
pub fn load_session(args: &SourceArgs, config: &Config, global: &GlobalOpts) -> Result<Session> {
    let paths = source_paths(args, config)?;
    if paths.is_empty() {
        return Err(AnalysisError::NoUsableSources.into());
    }

    let options = LoadOptions {
        columns: config.columns.clone(),
        delimiter: args.delimiter,
    };
    let outcome = load_sources(&paths, &options);

    if !global.quiet {
        for table in &outcome.tables {
            eprintln!(
                "{} Loaded {} ({} rows)",
                style("✓").green(),
                style(table.source_id()).cyan(),
                table.len()
            );
        }
    }
    for err in &outcome.errors {
        eprintln!("{} {}", style("✗").red(), err);
    }

    let session = Session::from_tables(outcome.tables, outcome.errors)?;

    if !global.quiet {
        eprintln!(
            "{} sources → {} unique relationships",
            style(session.tables().len()).bold(),
            style(session.combined().len()).bold()
        );
    }

    Ok(session)
}

/// Labels to search; empty means every loaded source
pub fn selected_labels(args: &SelectArgs, session: &Session) -> Result<Vec<String>> {
    if !args.pick {
        return Ok(args.select.clone());
    }

    let labels = session.labels();
    let defaults = vec![true; labels.len()];
    let chosen = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Sources to search")
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .into_diagnostic()?;

    if chosen.is_empty() {
        return Err(miette::miette!("no sources selected"));
    }
    Ok(chosen.into_iter().map(|i| labels[i].clone()).collect())
}

/// Write content to a file, or stdout when no path is given
pub fn write_output(content: &str, output_path: Option<&PathBuf>, global: &GlobalOpts) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !global.quiet {
                eprintln!("{} Report written to {}", style("✓").green(), path.display());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PresetSource;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn test_source_paths_order() {
        let config = Config {
            sources: vec![PresetSource {
                label: "plant-a".into(),
                path: "boms/a.csv".into(),
            }],
            ..Default::default()
        };
        let args = SourceArgs {
            boms: vec!["x.csv".into(), "y.csv".into()],
            presets: vec!["PLANT-A".into()],
            ..Default::default()
        };
        let paths = source_paths(&args, &config).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("boms/a.csv"),
                PathBuf::from("x.csv"),
                PathBuf::from("y.csv")
            ]
        );
    }

    #[test]
    fn test_unknown_preset() {
        let args = SourceArgs {
            presets: vec!["nope".into()],
            ..Default::default()
        };
        assert!(source_paths(&args, &Config::default()).is_err());
    }
}
