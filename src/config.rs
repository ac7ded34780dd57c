// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Environment variable pointing at a YAML config file.
pub const CONFIG_ENV: &str = "MLBSTATS_CONFIG";
/// Config file picked up from the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.yaml";

/// A known category: its human label and the data fields its rows carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySchema {
    pub label: String,
    pub fields: Vec<String>,
}

impl CategorySchema {
    pub fn new(label: &str, fields: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Harvester output, one `<year>_<league>_*.csv` per year and league.
    pub raw_dir: PathBuf,
    /// Where normalized Parquet artifacts and the run report go.
    pub processed_dir: PathBuf,
    /// SQLite database the tables are loaded into.
    pub db_path: PathBuf,
    /// Field separator inside a record's `text`.
    pub delimiter: String,
    /// Rows whose text starts with this are repeated table headers.
    pub header_marker: String,
    /// Characters removed before numeric parsing.
    pub thousands_separators: Vec<char>,
    /// Category identifier → fixed schema. Anything else gets a generic schema.
    pub categories: BTreeMap<String, CategorySchema>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            "table_2".to_string(),
            CategorySchema::new(
                "Individual Pitching Stats",
                &["Statistic", "Player", "Team", "Value"],
            ),
        );
        categories.insert(
            "table_5".to_string(),
            CategorySchema::new("Team Pitching Stats", &["Statistic", "Team", "Value"]),
        );

        Self {
            raw_dir: PathBuf::from("data/year_details/raw"),
            processed_dir: PathBuf::from("data/year_details/processed"),
            db_path: PathBuf::from("data/db/mlb_history.db"),
            delimiter: " | ".to_string(),
            header_marker: "Statistic".to_string(),
            thousands_separators: vec![','],
            categories,
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML config file. Missing keys fall back to defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from `$MLBSTATS_CONFIG`, then `./pipeline.yaml`,
    /// then built-in defaults.
    pub fn load() -> Result<Self> {
        if let Ok(p) = env::var(CONFIG_ENV) {
            info!(path = %p, "loading config from {}", CONFIG_ENV);
            return Self::from_yaml_file(p);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            info!(path = %local.display(), "loading config");
            return Self::from_yaml_file(local);
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_ship_both_pitching_schemas() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.categories.len(), 2);
        assert_eq!(cfg.categories["table_2"].fields.len(), 4);
        assert_eq!(cfg.categories["table_5"].label, "Team Pitching Stats");
        assert_eq!(cfg.delimiter, " | ");
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "db_path: /tmp/other.db\ncategories:\n  table_7:\n    label: Saves\n    fields: [Player, Saves]\n"
        )?;

        let cfg = PipelineConfig::from_yaml_file(tmp.path())?;
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(cfg.header_marker, "Statistic");
        // an explicit category table replaces the default one
        assert_eq!(cfg.categories.len(), 1);
        assert_eq!(
            cfg.categories["table_7"],
            CategorySchema::new("Saves", &["Player", "Saves"])
        );
        Ok(())
    }
}
