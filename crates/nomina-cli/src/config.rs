//! `nomina.toml` configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use nomina_render::ExcelRenderer;
use nomina_source::DEFAULT_URL;
use serde::Deserialize;
use tracing::{debug, info};

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "nomina.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// Where the last successful download is kept between runs
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: 20,
            cache_ttl_secs: 30,
            snapshot_path: None,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("nomina").join("snapshot.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub max_column_width: usize,
    pub text_column_min_width: usize,
    pub sheet_name_limit: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let excel = ExcelRenderer::default();
        Self {
            max_column_width: excel.max_column_width,
            text_column_min_width: excel.text_column_min_width,
            sheet_name_limit: excel.sheet_name_limit,
        }
    }
}

impl ExportConfig {
    pub fn renderer(&self) -> ExcelRenderer {
        ExcelRenderer::new()
            .max_column_width(self.max_column_width)
            .text_column_min_width(self.text_column_min_width)
            .sheet_name_limit(self.sheet_name_limit)
    }
}

impl Config {
    /// Load from an explicit path (must exist), else `./nomina.toml` if
    /// present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
