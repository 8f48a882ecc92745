use crate::app::presenter::OutputFormat;
use crate::config::toml_config::{CompatConfig, SourceKind};
use crate::config::DEFAULT_CONFIG_FILE;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "agro-compat")]
#[command(about = "Check whether a chemical and a biological product can be combined")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./compat-config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the source type from the config file
    #[arg(long, global = true, value_enum)]
    pub source: Option<SourceKind>,

    /// Google spreadsheet id
    #[arg(long, global = true)]
    pub spreadsheet_id: Option<String>,

    /// CSV URL template containing {table}
    #[arg(long, global = true)]
    pub url_template: Option<String>,

    /// Directory holding {table}.csv files
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Report whether a chemical and a biological product are compatible
    Check {
        #[arg(long)]
        chemical: String,
        #[arg(long)]
        biological: String,
    },
    /// List the selectable product names
    List,
    /// Ask for an untested combination to be tested (not persisted)
    RequestTest {
        #[arg(long)]
        chemical: String,
        #[arg(long)]
        biological: String,
    },
}

impl CliConfig {
    /// Defaults, then the config file, then command line flags.
    pub fn load_config(&self) -> Result<CompatConfig> {
        let mut config = match &self.config {
            Some(path) => CompatConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                CompatConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => CompatConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut CompatConfig) {
        if let Some(id) = &self.spreadsheet_id {
            config.source.spreadsheet_id = Some(id.clone());
        }
        if let Some(template) = &self.url_template {
            config.source.url_template = Some(template.clone());
        }
        if let Some(dir) = &self.data_dir {
            config.source.directory = Some(dir.clone());
        }

        // Without an explicit --source, a location flag picks its own source type.
        let inferred = if self.data_dir.is_some() {
            Some(SourceKind::Local)
        } else if self.url_template.is_some() {
            Some(SourceKind::CsvUrl)
        } else if self.spreadsheet_id.is_some() {
            Some(SourceKind::GoogleSheets)
        } else {
            None
        };
        if let Some(kind) = self.source.or(inferred) {
            config.source.r#type = kind;
        }
    }
}
