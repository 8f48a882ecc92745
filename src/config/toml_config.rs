use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CompatError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://docs.google.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    pub source: SourceConfig,
    pub tables: TableNames,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SourceKind {
    #[default]
    GoogleSheets,
    CsvUrl,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub spreadsheet_id: Option<String>,
    pub base_url: String,
    pub url_template: Option<String>,
    pub directory: Option<String>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: SourceKind::GoogleSheets,
            spreadsheet_id: None,
            base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            url_template: None,
            directory: None,
            timeout_seconds: 30,
            retry_attempts: 0,
            retry_delay_seconds: 1,
        }
    }
}

/// Sheet (or file) names of the three tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub chemicals: String,
    pub biologicals: String,
    pub compatibility: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            chemicals: "Quimicos".to_string(),
            biologicals: "Biologicos".to_string(),
            compatibility: "Compatibilidade".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CompatConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CompatError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CompatError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COMPAT_SPREADSHEET_ID})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CompatError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Source and settings together.
    pub fn validate_config(&self) -> Result<()> {
        self.source.validate_source()?;
        self.validate_settings()
    }

    /// Everything except `source.*`. A bad source only degrades the session,
    /// these settings stop the run.
    pub fn validate_settings(&self) -> Result<()> {
        validation::validate_non_empty_string("tables.chemicals", &self.tables.chemicals)?;
        validation::validate_non_empty_string("tables.biologicals", &self.tables.biologicals)?;
        validation::validate_non_empty_string("tables.compatibility", &self.tables.compatibility)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(CompatError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        Ok(())
    }
}

impl SourceConfig {
    pub fn validate_source(&self) -> Result<()> {
        match self.r#type {
            SourceKind::GoogleSheets => {
                let id = validation::validate_required_field(
                    "source.spreadsheet_id",
                    &self.spreadsheet_id,
                )?;
                validation::validate_non_empty_string("source.spreadsheet_id", id)?;
                if id.contains("${") {
                    return Err(CompatError::InvalidConfigValueError {
                        field: "source.spreadsheet_id".to_string(),
                        value: id.clone(),
                        reason: "Environment variable is not set".to_string(),
                    });
                }
                validation::validate_url("source.base_url", &self.base_url)?;
            }
            SourceKind::CsvUrl => {
                let template = validation::validate_required_field(
                    "source.url_template",
                    &self.url_template,
                )?;
                validation::validate_url_template("source.url_template", template)?;
            }
            SourceKind::Local => {
                let directory =
                    validation::validate_required_field("source.directory", &self.directory)?;
                validation::validate_directory("source.directory", directory)?;
            }
        }

        validation::validate_range("source.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validation::validate_range("source.retry_attempts", self.retry_attempts, 0, 10)?;
        validation::validate_range(
            "source.retry_delay_seconds",
            self.retry_delay_seconds,
            0,
            60,
        )?;

        Ok(())
    }
}

impl ConfigProvider for CompatConfig {
    fn source(&self) -> &SourceConfig {
        &self.source
    }

    fn tables(&self) -> &TableNames {
        &self.tables
    }
}

impl Validate for CompatConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_google_sheets_config() {
        let toml_content = r#"
[source]
type = "google_sheets"
spreadsheet_id = "1AbCdEf"
timeout_seconds = 10

[tables]
chemicals = "Chemicals"
"#;

        let config = CompatConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.r#type, SourceKind::GoogleSheets);
        assert_eq!(config.source.spreadsheet_id.as_deref(), Some("1AbCdEf"));
        assert_eq!(config.source.base_url, DEFAULT_GOOGLE_BASE_URL);
        assert_eq!(config.source.timeout_seconds, 10);
        assert_eq!(config.tables.chemicals, "Chemicals");
        assert_eq!(config.tables.biologicals, "Biologicos");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CompatConfig::from_toml_str("").unwrap();

        assert_eq!(config.source.r#type, SourceKind::GoogleSheets);
        assert_eq!(config.tables.compatibility, "Compatibilidade");
        assert_eq!(config.logging.level, "info");
        assert!(matches!(
            config.validate(),
            Err(CompatError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("AGRO_COMPAT_TEST_SHEET", "sheet-from-env");

        let toml_content = r#"
[source]
spreadsheet_id = "${AGRO_COMPAT_TEST_SHEET}"
"#;

        let config = CompatConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.spreadsheet_id.as_deref(), Some("sheet-from-env"));

        std::env::remove_var("AGRO_COMPAT_TEST_SHEET");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[source]
spreadsheet_id = "${AGRO_COMPAT_UNSET_VARIABLE}"
"#;

        let config = CompatConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CompatError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_csv_url_requires_placeholder() {
        let toml_content = r#"
[source]
type = "csv_url"
url_template = "https://example.com/export.csv"
"#;

        let config = CompatConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_logging_level() {
        let toml_content = r#"
[source]
type = "local"
directory = "./data"

[logging]
level = "loud"
"#;

        let config = CompatConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate_settings(),
            Err(CompatError::InvalidConfigValueError { ref field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_source_errors_do_not_affect_settings() {
        let config = CompatConfig::from_toml_str("").unwrap();

        assert!(config.validate_settings().is_ok());
        assert!(matches!(
            config.source.validate_source(),
            Err(CompatError::MissingConfigError { ref field }) if field == "source.spreadsheet_id"
        ));
    }

    #[test]
    fn test_missing_local_directory_fails_source_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = CompatConfig::default();
        config.source.r#type = SourceKind::Local;
        config.source.directory = Some(dir.path().join("absent").to_str().unwrap().to_string());

        assert!(config.source.validate_source().is_err());

        config.source.directory = Some(dir.path().to_str().unwrap().to_string());
        assert!(config.source.validate_source().is_ok());
    }

    #[test]
    fn test_unknown_source_type_is_rejected() {
        let toml_content = r#"
[source]
type = "ftp"
"#;

        assert!(matches!(
            CompatConfig::from_toml_str(toml_content),
            Err(CompatError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let data_dir = tempfile::TempDir::new().unwrap();

        let toml_content = format!(
            "[source]\ntype = \"local\"\ndirectory = \"{}\"\n",
            data_dir.path().to_str().unwrap().replace('\\', "/")
        );

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = CompatConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.source.r#type, SourceKind::Local);
        assert!(config.validate().is_ok());
    }
}
