//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqlsift_core::ExtractMode;
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

/// Configuration for sqlsift
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQL dialect ("postgresql" or "mysql")
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format (human, json)
    #[serde(default)]
    pub format: Option<String>,

    /// Tables whose rows are extracted in rows mode
    #[serde(default)]
    pub allow_tables: Option<Vec<String>>,

    /// Columns appended as NULL to every split row
    #[serde(default)]
    pub inject_columns: Option<Vec<String>>,

    /// Archive folder, relative to the input folder
    pub archive_dir: Option<String>,

    /// Output folder for CREATE statements
    pub creates_dir: Option<String>,

    /// Output folder for INSERT statements
    pub inserts_dir: Option<String>,

    /// Output folder for split rows
    pub rows_dir: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let config: Config = toml::from_str(&contents).into_diagnostic()?;
        Ok(config)
    }

    /// Try to find and load sqlsift.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let current_dir = std::env::current_dir().into_diagnostic()?;
        Self::find_from(current_dir)
    }

    fn find_from(mut current_dir: PathBuf) -> Result<Option<Self>> {
        loop {
            let config_path = current_dir.join("sqlsift.toml");
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        dialect: &Option<String>,
        format: &Option<OutputFormat>,
        allow: &[String],
        inject: &[String],
    ) -> Self {
        if dialect.is_some() {
            self.dialect = dialect.clone();
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        if !allow.is_empty() {
            self.allow_tables = Some(allow.to_vec());
        }

        if !inject.is_empty() {
            self.inject_columns = Some(inject.to_vec());
        }

        self
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Human,
        }
    }

    /// Output folder name for a mode
    pub fn output_dir(&self, mode: ExtractMode) -> &str {
        let configured = match mode {
            ExtractMode::Creates => &self.creates_dir,
            ExtractMode::Inserts => &self.inserts_dir,
            ExtractMode::Rows => &self.rows_dir,
        };
        configured
            .as_deref()
            .unwrap_or_else(|| mode.default_output_dir())
    }

    pub fn archive_dir(&self) -> &str {
        self.archive_dir.as_deref().unwrap_or("archive")
    }
}
