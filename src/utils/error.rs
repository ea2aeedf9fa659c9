use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid weight {weight} for collaborator '{email}': weights must be 0 or between 1e-6 and 1e6")]
    InvalidWeight { email: String, weight: f64 },

    #[error("Malformed collaborator email: '{email}'")]
    MalformedEmail { email: String },

    #[error("Assignment of category '{category_id}' references plot point '{plot_point_id}' which is not in this batch")]
    UnknownPlotPoint {
        plot_point_id: String,
        category_id: String,
    },

    #[error("Plot point '{plot_point_id}' appears more than once in the batch")]
    DuplicatePlotPoint { plot_point_id: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// 錯誤分類，用於日誌與統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Serialization,
    Configuration,
    InputContract,
    Processing,
}

/// 錯誤嚴重程度，決定 CLI 結束碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InsightsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Io,
            Self::SerializationError(_) | Self::CsvError(_) => ErrorCategory::Serialization,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidWeight { .. } => ErrorCategory::Configuration,
            Self::MalformedEmail { .. }
            | Self::UnknownPlotPoint { .. }
            | Self::DuplicatePlotPoint { .. }
            | Self::ValidationError { .. } => ErrorCategory::InputContract,
            Self::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::InputContract => ErrorSeverity::High,
            ErrorCategory::Serialization => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::IoError(_) => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            Self::ZipError(_) => "Disable compression or free up disk space and retry".to_string(),
            Self::SerializationError(_) => {
                "Make sure the snapshot is valid JSON with camelCase field names".to_string()
            }
            Self::CsvError(_) => "Retry the export with a different output format".to_string(),
            Self::ConfigValidationError { .. } => {
                "Review the TOML configuration file for syntax errors".to_string()
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration", field)
            }
            Self::MissingConfigError { field } => {
                format!("Add '{}' to the configuration or pass it on the command line", field)
            }
            Self::InvalidWeight { email, .. } => format!(
                "Set a weight of 0 or between 1e-6 and 1e6 for '{}', or remove it to use the default 1.0",
                email
            ),
            Self::MalformedEmail { .. } => {
                "Collaborator emails must look like name@domain.tld".to_string()
            }
            Self::UnknownPlotPoint { .. } => {
                "Export the snapshot again so every assignment belongs to a plot point in the same variant"
                    .to_string()
            }
            Self::DuplicatePlotPoint { .. } => {
                "Remove the duplicated plot point from the snapshot".to_string()
            }
            Self::ProcessingError { .. } | Self::ValidationError { .. } => {
                "Run again with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write files: {}", self),
            ErrorCategory::Serialization => format!("Could not parse or export data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::InputContract => format!("The snapshot is malformed: {}", self),
            ErrorCategory::Processing => format!("Metrics computation failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightsError>;
