#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use toml_config::{CompatConfig, SourceConfig, SourceKind, TableNames};

pub const DEFAULT_CONFIG_FILE: &str = "compat-config.toml";
