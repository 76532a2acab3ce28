// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::schema::{AliasTable, LogicalField};

pub const DEFAULT_RIDERSHIP_CAP: i64 = 100_000;
pub const DEFAULT_PERCENTAGE_CAP: f64 = 200.0;
pub const DEFAULT_STATION_ID: i64 = 1;
pub const DEFAULT_RAW_TEXT: &str = "MTA Aggregate";

/// Inclusive upper bounds applied by the field cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Caps {
    pub ridership: i64,
    pub percentage: f64,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            ridership: DEFAULT_RIDERSHIP_CAP,
            percentage: DEFAULT_PERCENTAGE_CAP,
        }
    }
}

/// Run settings, loadable from YAML. Every field has a default so a partial
/// file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub ridership_cap: i64,
    pub percentage_cap: f64,
    pub station_id: i64,
    pub raw_text: String,
    /// Extra header names per logical field, e.g. `subway: ["Subway Riders"]`.
    pub extra_aliases: HashMap<String, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            report: None,
            ridership_cap: DEFAULT_RIDERSHIP_CAP,
            percentage_cap: DEFAULT_PERCENTAGE_CAP,
            station_id: DEFAULT_STATION_ID,
            raw_text: DEFAULT_RAW_TEXT.to_string(),
            extra_aliases: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text).context("parsing pipeline config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn caps(&self) -> Caps {
        Caps {
            ridership: self.ridership_cap,
            percentage: self.percentage_cap,
        }
    }

    /// Built-in aliases extended with `extra_aliases`.
    pub fn alias_table(&self) -> Result<AliasTable> {
        let mut table = AliasTable::standard();
        for (name, extra) in &self.extra_aliases {
            let field = LogicalField::ALL
                .into_iter()
                .find(|f| f.as_str() == name.as_str())
                .with_context(|| format!("unknown field `{}` in extra_aliases", name))?;
            table = table.with_aliases(field, extra);
        }
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.ridership_cap >= 0,
            "ridership_cap must be non-negative, got {}",
            self.ridership_cap
        );
        anyhow::ensure!(
            self.percentage_cap.is_finite() && self.percentage_cap >= 0.0,
            "percentage_cap must be a non-negative number, got {}",
            self.percentage_cap
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_cleaning_rules() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.caps(), Caps::default());
        assert_eq!(cfg.caps().ridership, 100_000);
        assert_eq!(cfg.caps().percentage, 200.0);
        assert_eq!(cfg.station_id, 1);
        assert_eq!(cfg.raw_text, "MTA Aggregate");
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let cfg = PipelineConfig::from_yaml_str("input: raw.csv\nridership_cap: 5000\n")?;
        assert_eq!(cfg.input, Some(PathBuf::from("raw.csv")));
        assert_eq!(cfg.ridership_cap, 5000);
        assert_eq!(cfg.percentage_cap, 200.0);
        assert!(cfg.output.is_none());
        Ok(())
    }

    #[test]
    fn rejects_negative_cap() {
        assert!(PipelineConfig::from_yaml_str("ridership_cap: -1\n").is_err());
    }

    #[test]
    fn loads_from_file_with_extra_aliases() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "output: out/clean.csv")?;
        writeln!(tmp, "extra_aliases:")?;
        writeln!(tmp, "  subway: [\"Subway Riders\"]")?;
        let cfg = PipelineConfig::load(tmp.path())?;
        let table = cfg.alias_table()?;
        assert_eq!(
            table.aliases(LogicalField::Subway).last().map(String::as_str),
            Some("subway_riders")
        );
        Ok(())
    }

    #[test]
    fn unknown_alias_field_is_an_error() {
        let mut cfg = PipelineConfig::default();
        cfg.extra_aliases
            .insert("ferry".into(), vec!["Ferry Riders".into()]);
        assert!(cfg.alias_table().is_err());
    }
}
