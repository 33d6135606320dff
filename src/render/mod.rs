//! Report rendering
//!
//! Turns a [`ReportModel`] into one of several output formats:
//! - Markdown: human-readable index plus one section per part
//! - CSV: one flat row per tree node, for spreadsheets
//! - JSON / YAML: the model itself, for programmatic use
//! - HTML: hyperlinked standalone page
//!
//! Part numbers reach the renderers unmodified; deep links are built here
//! from the configured link template.

mod csv;
mod html;
pub mod links;
mod markdown;
mod structured;

pub use self::csv::CsvRenderer;
pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;
pub use structured::{JsonRenderer, YamlRenderer};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::report::ReportModel;

/// Errors that can occur during report rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Template error: {0}")]
    Template(String),
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown tables
    #[default]
    Md,
    /// JSON document
    Json,
    /// YAML document
    Yaml,
    /// Flat CSV, one row per tree node
    Csv,
    /// Standalone hyperlinked HTML page
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Md => "md",
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }

    /// Infer the format from an output file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(ReportFormat::Md),
            "json" => Some(ReportFormat::Json),
            "yaml" | "yml" => Some(ReportFormat::Yaml),
            "csv" => Some(ReportFormat::Csv),
            "html" | "htm" => Some(ReportFormat::Html),
            _ => None,
        }
    }

    /// Parse a format name as written in config files
    pub fn parse(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

/// Settings shared by every renderer
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Deep-link template containing `{part}`
    pub link_template: Option<String>,
}

impl RenderOptions {
    /// Deep link for a part number, when a template is configured
    pub fn link(&self, part: &str) -> Option<String> {
        self.link_template
            .as_deref()
            .map(|template| links::part_url(template, part))
    }
}

/// Trait for report renderers
pub trait ReportRenderer {
    /// Render the full report
    fn render(&self, model: &ReportModel, options: &RenderOptions) -> Result<String, RenderError>;

    /// Get the format this renderer produces
    fn format(&self) -> ReportFormat;
}

/// Renderer for a format
pub fn renderer_for(format: ReportFormat) -> Result<Box<dyn ReportRenderer>, RenderError> {
    Ok(match format {
        ReportFormat::Md => Box::new(MarkdownRenderer),
        ReportFormat::Json => Box::new(JsonRenderer),
        ReportFormat::Yaml => Box::new(YamlRenderer),
        ReportFormat::Csv => Box::new(CsvRenderer),
        ReportFormat::Html => Box::new(HtmlRenderer::new()?),
    })
}

/// Render a model in the given format
pub fn render(
    model: &ReportModel,
    format: ReportFormat,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    renderer_for(format)?.render(model, options)
}
