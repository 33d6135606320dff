//! JSON and YAML renderers
//!
//! Both serialize the report model as-is, with the run summary and, when a
//! link template is configured, a part → URL map for every emitted part.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{RenderError, RenderOptions, ReportFormat, ReportRenderer};
use crate::core::report::{AnalysisSummary, PartSheet, ReportModel};

#[derive(Serialize)]
struct Document<'a> {
    summary: AnalysisSummary,
    #[serde(flatten)]
    report: &'a ReportModel,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    links: BTreeMap<&'a str, String>,
}

impl<'a> Document<'a> {
    fn new(model: &'a ReportModel, options: &RenderOptions) -> Self {
        let mut links = BTreeMap::new();
        if options.link_template.is_some() {
            let parts = model.index_rows.iter().map(|r| r.part.as_str()).chain(
                model.part_sheets.iter().flat_map(|sheet| match sheet {
                    PartSheet::Tree { nodes, .. } => {
                        nodes.iter().map(|n| n.part.as_str()).collect::<Vec<_>>()
                    }
                    PartSheet::Component(record) => vec![record.part.as_str()],
                }),
            );
            for part in parts {
                if let Some(url) = options.link(part) {
                    links.insert(part, url);
                }
            }
        }

        Self {
            summary: model.summary(),
            report: model,
            links,
        }
    }
}

/// JSON renderer
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, model: &ReportModel, options: &RenderOptions) -> Result<String, RenderError> {
        let mut out = serde_json::to_string_pretty(&Document::new(model, options))
            .map_err(|e| RenderError::Serialization(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

/// YAML renderer
pub struct YamlRenderer;

impl ReportRenderer for YamlRenderer {
    fn render(&self, model: &ReportModel, options: &RenderOptions) -> Result<String, RenderError> {
        serde_yml::to_string(&Document::new(model, options))
            .map_err(|e| RenderError::Serialization(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Yaml
    }
}
