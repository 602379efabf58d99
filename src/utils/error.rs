use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Unsupported country code: {code}")]
    InvalidCountry { code: String },

    #[error("Unknown device identifier(s): {}", .ids.join(", "))]
    InvalidDevice { ids: Vec<String> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Dataset error in {file} line {line}: {message}")]
    DatasetError {
        file: String,
        line: u64,
        message: String,
    },

    #[error("Referential integrity violated: {message}")]
    IntegrityError { message: String },

    #[error("Store error: {message}")]
    StoreError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Request,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    High,
    Critical,
}

impl MatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MatchError::InvalidCountry { .. } | MatchError::InvalidDevice { .. } => {
                ErrorCategory::Request
            }
            MatchError::ConfigError { .. }
            | MatchError::ConfigValidationError { .. }
            | MatchError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            MatchError::CsvError(_)
            | MatchError::DatasetError { .. }
            | MatchError::IntegrityError { .. }
            | MatchError::SerializationError(_) => ErrorCategory::Data,
            MatchError::IoError(_) | MatchError::StoreError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 客戶端錯誤：輸入的過濾條件不合法
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Request
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MatchError::InvalidCountry { .. } => {
                "Use one of the supported country codes: GB, US, JP"
            }
            MatchError::InvalidDevice { .. } => {
                "List known devices with the 'devices' command or GET /devices/"
            }
            MatchError::ConfigError { .. }
            | MatchError::ConfigValidationError { .. }
            | MatchError::InvalidConfigValueError { .. } => {
                "Check the TOML file and command line flags"
            }
            MatchError::CsvError(_) | MatchError::DatasetError { .. } => {
                "Check the dataset CSV files for malformed rows"
            }
            MatchError::IntegrityError { .. } => {
                "Make sure every bug and ownership row references an existing tester and device"
            }
            MatchError::SerializationError(_) => "Report this as a bug",
            MatchError::IoError(_) => "Check that the dataset directory exists and is readable",
            MatchError::StoreError { .. } => "Restart the service",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MatchError::InvalidCountry { .. } => {
                "Query parameter 'countries' has invalid value".to_string()
            }
            MatchError::InvalidDevice { .. } => {
                "Query parameter 'devices' has invalid value".to_string()
            }
            MatchError::IoError(e) => format!("Could not read input: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_errors_are_client_errors() {
        let err = MatchError::InvalidCountry {
            code: "FR".to_string(),
        };
        assert!(err.is_client_error());
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(
            err.user_friendly_message(),
            "Query parameter 'countries' has invalid value"
        );

        let err = MatchError::InvalidDevice {
            ids: vec!["7".to_string(), "x".to_string()],
        };
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Unknown device identifier(s): 7, x");
    }

    #[test]
    fn test_data_errors_are_not_client_errors() {
        let err = MatchError::IntegrityError {
            message: "bug 1 references missing tester 9".to_string(),
        };
        assert!(!err.is_client_error());
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
