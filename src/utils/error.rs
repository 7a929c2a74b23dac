use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrientationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Required input file not found: {path}")]
    MissingInputError { path: String },

    #[error("Malformed input in {path}: {message}")]
    InvalidInputError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OrientationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingInputError { .. } | Self::InvalidInputError { .. } | Self::CsvError(_) => {
                ErrorCategory::Input
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::ProcessingError { .. } | Self::SerializationError(_) => ErrorCategory::Processing,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Exit code reported by the CLI for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingInputError { path } => format!("Input file is missing: {}", path),
            Self::InvalidInputError { path, message } => {
                format!("Could not read {}: {}", path, message)
            }
            Self::CsvError(e) => format!("A CSV file could not be parsed: {}", e),
            Self::ConfigError { message } => format!("Invalid configuration: {}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::ProcessingError { message } => format!("Analysis failed: {}", message),
            Self::SerializationError(e) => format!("Could not serialize the summary: {}", e),
            Self::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingInputError { .. } => {
                "Check --input-dir and make sure properties.csv (or transactions.csv and gnaf_prop.csv) and roads.geojson exist"
            }
            Self::InvalidInputError { .. } | Self::CsvError(_) => {
                "Check that the input files have the expected columns and valid values"
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags and run again"
            }
            Self::ProcessingError { .. } | Self::SerializationError(_) => {
                "Run again with --verbose to see which step failed"
            }
            Self::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn missing_input(path: impl Into<String>) -> Self {
        Self::MissingInputError { path: path.into() }
    }

    pub fn invalid_input(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInputError {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrientationError>;
