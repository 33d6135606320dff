//! Markdown report renderer

use tabled::{builder::Builder, settings::Style};

use super::links::sheet_anchors;
use super::{RenderError, RenderOptions, ReportFormat, ReportRenderer};
use crate::core::report::{PartSheet, ReportModel};

/// Markdown renderer: index table followed by one section per part
pub struct MarkdownRenderer;

/// Escape characters that would break a markdown table cell
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn linked(text: &str, url: Option<String>) -> String {
    match url {
        Some(url) => format!("[{}]({})", cell(text), url),
        None => cell(text),
    }
}

/// Indented level notation: `.1` for direct children, `..2` below them
fn level(depth: usize) -> String {
    format!("{}{}", ".".repeat(depth + 1), depth + 1)
}

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, model: &ReportModel, options: &RenderOptions) -> Result<String, RenderError> {
        let anchors = sheet_anchors(model);
        let mut output = String::new();

        output.push_str("# BOM Analysis Report\n\n");
        if let Some(row) = model.index_rows.first() {
            output.push_str(&format!(
                "Searched sources: {}\n\n",
                row.searched_sources.join(", ")
            ));
        }

        let mut index = Builder::default();
        index.push_record(["Part Number", "Part Name", "Status", "Source BOMs", "Searched In"]);
        for row in &model.index_rows {
            let part = match anchors.get(&row.part) {
                Some(anchor) => format!("[{}](#{})", cell(&row.part), anchor),
                None => cell(&row.part),
            };
            index.push_record([
                part,
                cell(&row.display_name),
                row.status.to_string(),
                cell(&row.sources.join(", ")),
                cell(&row.searched_sources.join(", ")),
            ]);
        }
        output.push_str(&index.build().with(Style::markdown()).to_string());
        output.push('\n');

        for sheet in &model.part_sheets {
            let anchor = anchors.get(sheet.part()).cloned().unwrap_or_default();
            output.push_str(&format!("\n<a id=\"{}\"></a>\n\n", anchor));

            match sheet {
                PartSheet::Tree {
                    part,
                    display_name,
                    nodes,
                } => {
                    if display_name.is_empty() {
                        output.push_str(&format!("## {}\n\n", cell(part)));
                    } else {
                        output.push_str(&format!("## {}: {}\n\n", cell(part), cell(display_name)));
                    }
                    output.push_str(&format!("Main part: {}\n\n", linked(part, options.link(part))));

                    let mut table = Builder::default();
                    table.push_record(["Level", "Component", "Name", "Description", "Source BOM"]);
                    for node in nodes {
                        table.push_record([
                            level(node.depth),
                            linked(&node.part, options.link(&node.part)),
                            cell(&node.name),
                            cell(&node.description),
                            cell(&node.source),
                        ]);
                    }
                    output.push_str(&table.build().with(Style::markdown()).to_string());
                    output.push_str(&format!("\n\n*{} component(s)*\n", nodes.len()));
                }
                PartSheet::Component(record) => {
                    output.push_str(&format!("## {}\n\n", cell(&record.part)));
                    output.push_str("Component Information\n\n");

                    let mut table = Builder::default();
                    table.push_record(["Field", "Value"]);
                    table.push_record([
                        "Part Number".to_string(),
                        linked(&record.part, options.link(&record.part)),
                    ]);
                    table.push_record(["Name".to_string(), cell(&record.name)]);
                    table.push_record(["Description".to_string(), cell(&record.description)]);
                    table.push_record(["Source BOM".to_string(), cell(&record.source)]);
                    output.push_str(&table.build().with(Style::markdown()).to_string());
                    output.push('\n');
                }
            }
        }

        Ok(output)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Md
    }
}
