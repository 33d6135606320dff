//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::relation::ColumnMapping;

/// Project config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".bomtree.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
}

/// A named BOM file that can be selected with `--preset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSource {
    pub label: String,
    pub path: PathBuf,
}

/// bomtree configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mapping from source columns to BOM fields
    pub columns: ColumnMapping,

    /// Preset BOM sources, in the order they load
    pub sources: Vec<PresetSource>,

    /// Deep-link template for part numbers; `{part}` is replaced by the
    /// percent-encoded part number
    pub link_template: Option<String>,

    /// Default report format
    pub default_format: Option<String>,
}

/// Partial config as read from one file; unset fields do not override
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    columns: Option<ColumnMapping>,
    sources: Option<Vec<PresetSource>>,
    link_template: Option<String>,
    default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// An explicit `path` replaces the project config lookup and must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/bomtree/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::read_layer(&global_path)?);
            }
        }

        // 3. Project config (.bomtree.yaml or --config)
        match path {
            Some(explicit) => config.merge(Self::read_layer(explicit)?),
            None => {
                let project_path = Path::new(PROJECT_CONFIG_FILE);
                if project_path.exists() {
                    config.merge(Self::read_layer(project_path)?);
                }
            }
        }

        // 4. Environment variables
        if let Ok(template) = std::env::var("BOMTREE_LINK_TEMPLATE") {
            if !template.trim().is_empty() {
                config.link_template = Some(template);
            }
        }

        Ok(config)
    }

    fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(ConfigLayer::default());
        }
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "bomtree")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge a layer into this config (layer takes precedence)
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(columns) = layer.columns {
            self.columns = columns;
        }
        if let Some(sources) = layer.sources {
            self.sources = sources;
        }
        if layer.link_template.is_some() {
            self.link_template = layer.link_template;
        }
        if layer.default_format.is_some() {
            self.default_format = layer.default_format;
        }
    }

    /// Look up a preset source by label (case-insensitive)
    pub fn preset(&self, label: &str) -> Option<&PresetSource> {
        self.sources
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(label.trim()))
    }

    /// Example project config written by `bomtree config init`
    pub fn example() -> &'static str {
        r#"# bomtree project configuration

# Where the BOM fields live in your exports. Each entry is either a header
# name (case-insensitive) or a 1-based column position.
columns:
  product_no: "Product no"
  component_no: "Component no"
  product_name: 3
  name: 7
  description: 8

# Preset BOM files, selectable with --preset <label>
# sources:
#   - label: plant-a
#     path: boms/plant_a.csv

# Deep link attached to every part number in reports
# link_template: "https://drawings.example.com/part/{part}"

# Default report format (md, json, yaml, csv, html)
# default_format: md
"#
    }

    /// Write the example config, refusing to overwrite
    pub fn write_example(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        std::fs::write(path, Self::example()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relation::ColumnRef;
    use tempfile::tempdir;

    #[test]
    fn test_example_parses_to_defaults() {
        let layer: ConfigLayer = serde_yml::from_str(Config::example()).unwrap();
        assert_eq!(layer.columns, Some(ColumnMapping::default()));
        assert!(layer.sources.is_none());
    }

    #[test]
    fn test_layer_only_overrides_set_fields() {
        let mut config = Config {
            link_template: Some("https://a/{part}".into()),
            ..Default::default()
        };
        let layer: ConfigLayer = serde_yml::from_str("default_format: json\n").unwrap();
        config.merge(layer);
        assert_eq!(config.link_template.as_deref(), Some("https://a/{part}"));
        assert_eq!(config.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.yaml");
        std::fs::write(
            &path,
            "columns:\n  product_no: Parent\n  component_no: 2\nsources:\n  - label: Denmark\n    path: denmark.csv\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.columns.product_no, ColumnRef::Name("Parent".into()));
        assert_eq!(config.columns.component_no, ColumnRef::Position(2));
        assert_eq!(config.preset("denmark").unwrap().path, PathBuf::from("denmark.csv"));
        assert!(config.preset("spain").is_none());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "sources: [1, 2\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_write_example_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        Config::write_example(&path).unwrap();
        assert!(matches!(
            Config::write_example(&path),
            Err(ConfigError::AlreadyExists(_))
        ));
    }
}
