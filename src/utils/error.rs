use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Password required for encrypted file '{label}'")]
    MissingPassword { label: String },

    #[error("Could not decrypt '{label}': {reason}")]
    DecryptionFailed { label: String, reason: String },

    #[error("Could not read spreadsheet '{label}': {message}")]
    ParseFailure { label: String, message: String },

    #[error("Merge failed: {message}")]
    MergeFailure { message: String },

    #[error("No files have been uploaded in this session")]
    NoUploads,

    #[error("No merged data available, submit the uploaded files first")]
    NotMerged,

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Security,
    Data,
    Session,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::MissingPassword { .. } | LedgerError::DecryptionFailed { .. } => {
                ErrorCategory::Security
            }
            LedgerError::ParseFailure { .. } => ErrorCategory::Input,
            LedgerError::MergeFailure { .. } => ErrorCategory::Data,
            LedgerError::NoUploads | LedgerError::NotMerged => ErrorCategory::Session,
            LedgerError::CsvError(_)
            | LedgerError::IoError(_)
            | LedgerError::SerializationError(_) => ErrorCategory::System,
            LedgerError::ConfigError { .. } | LedgerError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Session => ErrorSeverity::Low,
            ErrorCategory::Security => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Data | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a fatal error. Low severity is a warning and
    /// exits successfully.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// Message shown inline to the user.
    pub fn user_friendly_message(&self) -> String {
        match self {
            LedgerError::MissingPassword { label } => {
                format!("'{}' is encrypted. Please enter its password.", label)
            }
            LedgerError::DecryptionFailed { label, .. } => {
                format!("'{}' could not be decrypted. Check the password.", label)
            }
            LedgerError::ParseFailure { label, message } => {
                format!("'{}' is not a readable spreadsheet ({}).", label, message)
            }
            LedgerError::MergeFailure { message } => format!("An error occurred: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LedgerError::MissingPassword { .. } => {
                "Pass the file password with --ledger-password / --price-password"
            }
            LedgerError::DecryptionFailed { .. } => {
                "Verify the password and that the file is an Excel workbook"
            }
            LedgerError::ParseFailure { .. } => {
                "Make sure the file is an .xlsx/.xls/.xlsb/.ods workbook with a header row"
            }
            LedgerError::MergeFailure { .. } => {
                "Check that both workbooks contain the configured column headers"
            }
            LedgerError::NoUploads => "Provide both the ledger and the price list files",
            LedgerError::NotMerged => "Submit the uploaded files before searching",
            LedgerError::CsvError(_) | LedgerError::SerializationError(_) => {
                "Try a different output format"
            }
            LedgerError::IoError(_) => "Check that the file paths exist and are readable",
            LedgerError::ConfigError { .. } | LedgerError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line arguments"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
