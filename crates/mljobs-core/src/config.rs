use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregation::TopNLimits;
use crate::charts::ChartStyle;
use crate::error::Result;
use crate::validation::ValidationThresholds;

pub const DEFAULT_INPUT_PATH: &str = "dataset/1000_ml_jobs_us.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Runtime settings. Every field has a default, so an empty (or absent) config file
/// reproduces the stock fixed-path behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub summary_rows: usize,
    pub charts: ChartConfig,
    pub validation: ValidationThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            summary_rows: 5,
            charts: ChartConfig::default(),
            validation: ValidationThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub top_companies: usize,
    pub titles_per_region: usize,
    pub top_senior_companies: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let style = ChartStyle::default();
        let limits = TopNLimits::default();
        Self {
            width: style.width,
            height: style.height,
            top_companies: limits.top_companies,
            titles_per_region: limits.titles_per_region,
            top_senior_companies: limits.top_senior_companies,
        }
    }
}

impl ChartConfig {
    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            width: self.width,
            height: self.height,
        }
    }

    pub fn limits(&self) -> TopNLimits {
        TopNLimits {
            top_companies: self.top_companies,
            titles_per_region: self.titles_per_region,
            top_senior_companies: self.top_senior_companies,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
