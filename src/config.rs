//! Startup configuration.
//!
//! Defaults are built in; an optional `mbti-dashboard.json` in the working
//! directory overrides them and `MBTI_DATA_PATH` overrides the data path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::TypeKey;

pub const CONFIG_FILE: &str = "mbti-dashboard.json";
pub const DATA_PATH_ENV: &str = "MBTI_DATA_PATH";

/// Bounds of the top-N slider.
pub const TOP_N_RANGE: std::ops::RangeInclusive<usize> = 5..=20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV (or JSON / Parquet) loaded at startup.
    pub data_path: PathBuf,

    /// Type selected when the dashboard opens.
    pub default_type: String,

    pub default_top_n: usize,

    /// Number of countries in the variance heatmap.
    pub heatmap_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("mbti_countries.csv"),
            default_type: "INFP".to_string(),
            default_top_n: 10,
            heatmap_rows: 20,
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the working directory and environment.
    /// A broken config file is reported and skipped.
    pub fn load() -> Self {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            match Self::from_file(Path::new(CONFIG_FILE)) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("Ignoring {CONFIG_FILE}: {e:#}");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if let Ok(path) = std::env::var(DATA_PATH_ENV) {
            if !path.trim().is_empty() {
                config.data_path = PathBuf::from(path);
            }
        }

        log::info!("Data path: {}", config.data_path.display());
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// The configured type, falling back to INFP when the label is unknown.
    /// Hand-written config files may use any case.
    pub fn initial_type(&self) -> TypeKey {
        let label = self.default_type.trim().to_ascii_uppercase();
        label.parse().unwrap_or_else(|e| {
            log::warn!("{e}; using INFP");
            TypeKey::Infp
        })
    }

    pub fn initial_top_n(&self) -> usize {
        self.default_top_n.clamp(*TOP_N_RANGE.start(), *TOP_N_RANGE.end())
    }

    pub fn heatmap_rows(&self) -> usize {
        self.heatmap_rows.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DashboardConfig::default();
        assert_eq!(c.initial_type(), TypeKey::Infp);
        assert_eq!(c.initial_top_n(), 10);
        assert_eq!(c.heatmap_rows(), 20);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "default_type": " entj ", "default_top_n": 50 }"#).unwrap();

        let c = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(c.initial_type(), TypeKey::Entj);
        assert_eq!(c.initial_top_n(), 20);
        assert_eq!(c.data_path, PathBuf::from("mbti_countries.csv"));
    }

    #[test]
    fn unknown_type_falls_back() {
        let c = DashboardConfig {
            default_type: "QQQQ".into(),
            default_top_n: 1,
            heatmap_rows: 0,
            ..Default::default()
        };
        assert_eq!(c.initial_type(), TypeKey::Infp);
        assert_eq!(c.initial_top_n(), 5);
        assert_eq!(c.heatmap_rows(), 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }
}
