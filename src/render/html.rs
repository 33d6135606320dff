//! HTML report renderer using an embedded Tera template

use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;

use super::links::sheet_anchors;
use super::{RenderError, RenderOptions, ReportFormat, ReportRenderer};
use crate::core::classify::PartStatus;
use crate::core::report::{PartSheet, ReportModel};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const REPORT_TEMPLATE: &str = "report.html";

#[derive(Serialize)]
struct RowView<'a> {
    part: &'a str,
    anchor: Option<&'a str>,
    display_name: &'a str,
    status: &'static str,
    status_class: &'static str,
    sources: String,
    searched_sources: String,
}

#[derive(Serialize)]
struct NodeView<'a> {
    level: usize,
    indent: usize,
    part: &'a str,
    url: Option<String>,
    name: &'a str,
    description: &'a str,
    source: &'a str,
}

#[derive(Serialize)]
struct SheetView<'a> {
    kind: &'static str,
    part: &'a str,
    anchor: &'a str,
    url: Option<String>,
    display_name: &'a str,
    nodes: Vec<NodeView<'a>>,
    name: &'a str,
    description: &'a str,
    source: &'a str,
}

/// Escape a URL for an attribute value; the template emits it unescaped
fn attr_url(url: String) -> String {
    url.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn status_class(status: PartStatus) -> &'static str {
    match status {
        PartStatus::BomFound => "found",
        PartStatus::ComponentOnly => "component-only",
        PartStatus::NotFound => "no-bom",
    }
}

/// HTML renderer: standalone page with index and per-part sections
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    /// Create a renderer with the embedded templates loaded
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let template_str = std::str::from_utf8(&content.data)
                    .map_err(|e| RenderError::Template(e.to_string()))?;
                tera.add_raw_template(filename, template_str)
                    .map_err(|e| RenderError::Template(e.to_string()))?;
            }
        }

        Ok(Self { tera })
    }
}

impl ReportRenderer for HtmlRenderer {
    fn render(&self, model: &ReportModel, options: &RenderOptions) -> Result<String, RenderError> {
        let anchors = sheet_anchors(model);

        let rows: Vec<RowView> = model
            .index_rows
            .iter()
            .map(|row| RowView {
                part: &row.part,
                anchor: anchors.get(&row.part).map(String::as_str),
                display_name: &row.display_name,
                status: row.status.as_str(),
                status_class: status_class(row.status),
                sources: row.sources.join(", "),
                searched_sources: row.searched_sources.join(", "),
            })
            .collect();

        let sheets: Vec<SheetView> = model
            .part_sheets
            .iter()
            .map(|sheet| {
                let part = sheet.part();
                let anchor = anchors.get(part).map(String::as_str).unwrap_or_default();
                match sheet {
                    PartSheet::Tree {
                        display_name,
                        nodes,
                        ..
                    } => SheetView {
                        kind: "tree",
                        part,
                        anchor,
                        url: options.link(part).map(attr_url),
                        display_name,
                        nodes: nodes
                            .iter()
                            .map(|n| NodeView {
                                level: n.depth + 1,
                                indent: n.depth * 20,
                                part: &n.part,
                                url: options.link(&n.part).map(attr_url),
                                name: &n.name,
                                description: &n.description,
                                source: &n.source,
                            })
                            .collect(),
                        name: "",
                        description: "",
                        source: "",
                    },
                    PartSheet::Component(record) => SheetView {
                        kind: "component",
                        part,
                        anchor,
                        url: options.link(part).map(attr_url),
                        display_name: "",
                        nodes: Vec::new(),
                        name: &record.name,
                        description: &record.description,
                        source: &record.source,
                    },
                }
            })
            .collect();

        let mut context = tera::Context::new();
        context.insert("rows", &rows);
        context.insert("sheets", &sheets);
        context.insert("summary", &model.summary());

        self.tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|e| RenderError::Template(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::sample_model;

    fn render(options: &RenderOptions) -> String {
        HtmlRenderer::new().unwrap().render(&sample_model(), options).unwrap()
    }

    #[test]
    fn test_index_rows_carry_status_classes() {
        let out = render(&RenderOptions::default());
        assert!(out.contains("class=\"no-bom\""));
        assert!(out.contains("class=\"component-only\""));
        assert!(out.contains("href=\"#part-a-100\""));
        assert!(out.contains("id=\"part-a-100\""));
    }

    #[test]
    fn test_drawing_links() {
        let options = RenderOptions {
            link_template: Some("https://d.example/view?part={part}".into()),
        };
        let out = render(&options);
        assert!(out.contains("href=\"https://d.example/view?part=B\""));
        assert!(out.contains("padding-left: 20px"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut model = sample_model();
        model.index_rows[2].part = "<script>".into();
        let out = HtmlRenderer::new()
            .unwrap()
            .render(&model, &RenderOptions::default())
            .unwrap();
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }
}
