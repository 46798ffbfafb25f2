use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtgenError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    #[error("Package \"{package}\" already exists")]
    AlreadyExists { package: String },

    #[error("Path conflict at {path}: {reason}")]
    PathConflict { path: String, reason: String },

    #[error("Source file {path} is already registered for package \"{package}\"")]
    AlreadyRegistered { package: String, path: String },

    #[error("Malformed declaration in {file} at line {line}: {reason}")]
    MalformedInput {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Source root is not set")]
    RootNotSet,

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Registry,
    Scan,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl UtgenError {
    pub fn not_found(kind: &str, name: impl Into<String>) -> Self {
        UtgenError::NotFound {
            kind: kind.to_string(),
            name: name.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            UtgenError::IoError(_) | UtgenError::SerializationError(_) => ErrorCategory::Io,
            UtgenError::NotFound { .. }
            | UtgenError::AlreadyExists { .. }
            | UtgenError::PathConflict { .. }
            | UtgenError::AlreadyRegistered { .. }
            | UtgenError::RootNotSet => ErrorCategory::Registry,
            UtgenError::MalformedInput { .. } => ErrorCategory::Scan,
            UtgenError::ConfigValidationError { .. }
            | UtgenError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            UtgenError::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    /// `Low` 代表冪等的 no-op：只輸出診斷訊息，不視為失敗
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            UtgenError::AlreadyExists { .. } | UtgenError::AlreadyRegistered { .. } => {
                ErrorSeverity::Low
            }
            UtgenError::NotFound { .. }
            | UtgenError::PathConflict { .. }
            | UtgenError::MalformedInput { .. }
            | UtgenError::ValidationError { .. } => ErrorSeverity::High,
            UtgenError::RootNotSet
            | UtgenError::ConfigValidationError { .. }
            | UtgenError::InvalidConfigValueError { .. } => ErrorSeverity::Medium,
            UtgenError::IoError(_) | UtgenError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            UtgenError::IoError(_) => {
                "Check file permissions and that the test directory is writable".to_string()
            }
            UtgenError::SerializationError(_) => {
                "The registry JSON may be corrupt; inspect or restore it from version control"
                    .to_string()
            }
            UtgenError::NotFound { kind, .. } if kind == "Registry" => {
                "Run `utgen init` in the test directory first".to_string()
            }
            UtgenError::NotFound { .. } => {
                "Check the name with `utgen get-test-packages` and the paths on disk".to_string()
            }
            UtgenError::AlreadyExists { .. } => "Nothing to do, the package exists".to_string(),
            UtgenError::PathConflict { .. } => {
                "Choose another package name or move the conflicting entry".to_string()
            }
            UtgenError::AlreadyRegistered { .. } => {
                "Nothing to do, the source file is registered".to_string()
            }
            UtgenError::MalformedInput { .. } => {
                "Declarations must look like `UNIT_TEST bool name() {`".to_string()
            }
            UtgenError::RootNotSet => "Run `utgen set-root <path>` first".to_string(),
            UtgenError::ConfigValidationError { .. } | UtgenError::InvalidConfigValueError { .. } => {
                "Review utgen.toml and the command line arguments".to_string()
            }
            UtgenError::ValidationError { .. } => {
                "Package names must be valid C identifiers".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            UtgenError::IoError(e) => format!("File system operation failed: {}", e),
            UtgenError::SerializationError(e) => format!("Could not read registry data: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UtgenError>;
