//! CSV report renderer
//!
//! One flat table, suitable for spreadsheet import: every tree node is a
//! row tagged with its queried root. Component-only and not-found parts get
//! a single row so every queried part is represented.

use ::csv::WriterBuilder;

use super::{RenderError, RenderOptions, ReportFormat, ReportRenderer};
use crate::core::report::{PartSheet, ReportModel};

/// CSV renderer
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn render(&self, model: &ReportModel, options: &RenderOptions) -> Result<String, RenderError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        let ser = |e: ::csv::Error| RenderError::Serialization(e.to_string());

        writer
            .write_record(["root", "status", "depth", "part", "name", "description", "source", "url"])
            .map_err(ser)?;

        for row in &model.index_rows {
            let status = row.status.to_string();
            match model.sheet(&row.part) {
                Some(PartSheet::Tree { nodes, .. }) => {
                    for node in nodes {
                        let depth = node.depth.to_string();
                        let url = options.link(&node.part).unwrap_or_default();
                        writer
                            .write_record([
                                row.part.as_str(),
                                status.as_str(),
                                depth.as_str(),
                                node.part.as_str(),
                                node.name.as_str(),
                                node.description.as_str(),
                                node.source.as_str(),
                                url.as_str(),
                            ])
                            .map_err(ser)?;
                    }
                }
                Some(PartSheet::Component(record)) => {
                    let url = options.link(&record.part).unwrap_or_default();
                    writer
                        .write_record([
                            row.part.as_str(),
                            status.as_str(),
                            "",
                            record.part.as_str(),
                            record.name.as_str(),
                            record.description.as_str(),
                            record.source.as_str(),
                            url.as_str(),
                        ])
                        .map_err(ser)?;
                }
                None => {
                    writer
                        .write_record([row.part.as_str(), status.as_str(), "", "", "", "", "", ""])
                        .map_err(ser)?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Serialization(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RenderError::Serialization(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::sample_model;

    #[test]
    fn test_rows_per_node_and_status() {
        let out = CsvRenderer
            .render(&sample_model(), &RenderOptions::default())
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "root,status,depth,part,name,description,source,url");
        assert_eq!(lines[1], "A/100,BOM Found,0,B,Housing,Housing desc,plant.csv,");
        assert_eq!(lines[2], "A/100,BOM Found,1,D,Screw,Screw desc,plant.csv,");
        assert_eq!(lines[4], "X,Component Only,,X,Bolt,M8,plant.csv,");
        assert_eq!(lines[5], "Y,No BOM Found,,,,,,");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_urls_filled_from_template() {
        let options = RenderOptions {
            link_template: Some("https://d.example/{part}".into()),
        };
        let out = CsvRenderer.render(&sample_model(), &options).unwrap();
        assert!(out
            .lines()
            .any(|l| l.ends_with(",B,Housing,Housing desc,plant.csv,https://d.example/B")));
    }
}
