use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Sheet request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Sheet source returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Malformed table '{table}': {message}")]
    DataFormatError { table: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CompatError {
    pub fn data_format(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataFormatError {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CompatError::ApiError(_) | CompatError::HttpStatusError { .. } => {
                ErrorCategory::Connection
            }
            CompatError::ConfigError { .. }
            | CompatError::ConfigValidationError { .. }
            | CompatError::InvalidConfigValueError { .. }
            | CompatError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CompatError::CsvError(_)
            | CompatError::SerializationError(_)
            | CompatError::DataFormatError { .. } => ErrorCategory::Data,
            CompatError::IoError(_) => ErrorCategory::System,
        }
    }

    /// Unreachable or malformed sources degrade the session; bad configuration stops the run.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Connection | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CompatError::ApiError(_) => {
                "Check the network connection and that the spreadsheet is reachable"
            }
            CompatError::HttpStatusError { .. } => {
                "Check the spreadsheet id and that the sheet is shared for reading"
            }
            CompatError::DataFormatError { .. } | CompatError::CsvError(_) => {
                "Check the table names and column headers of the spreadsheet"
            }
            CompatError::IoError(_) => "Check that the data directory exists and is readable",
            CompatError::SerializationError(_) => "Retry with --format text",
            CompatError::ConfigError { .. }
            | CompatError::ConfigValidationError { .. }
            | CompatError::InvalidConfigValueError { .. }
            | CompatError::MissingConfigError { .. } => {
                "Fix the configuration file or command line flags and try again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Connection => {
                format!("Could not reach the compatibility spreadsheet ({})", self)
            }
            ErrorCategory::Data => format!("The compatibility spreadsheet is unreadable ({})", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_is_connection_category() {
        let err = CompatError::HttpStatusError {
            status: 404,
            url: "https://example.com/sheet".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Connection);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("HTTP 404"));
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = CompatError::MissingConfigError {
            field: "source.spreadsheet_id".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_data_format_helper() {
        let err = CompatError::data_format("Quimicos", "missing column 'ID'");
        assert_eq!(
            err.to_string(),
            "Malformed table 'Quimicos': missing column 'ID'"
        );
    }
}
