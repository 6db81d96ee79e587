use thiserror::Error;

/// Failures while reading MRZ text. These never abort a scan on their own;
/// the detector treats them as "no MRZ in this arrangement" and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MrzError {
    #[error("{format} line {line} is {actual} characters, expected {expected}")]
    InvalidLength {
        format: &'static str,
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid MRZ character {character:?} on line {line}")]
    InvalidCharacter { line: usize, character: char },

    #[error("field {field} has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("check digit mismatch for {field}")]
    CheckDigit { field: &'static str },

    #[error("cannot recognize MRZ layout from {lines} non-empty lines")]
    UnrecognizedLayout { lines: usize },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("MRZ error: {0}")]
    MrzError(#[from] MrzError),

    #[error("OCR engine error: {message}")]
    OcrError { message: String },

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

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Unsupported input '{path}': {reason}")]
    InvalidInputError { path: String, reason: String },

    #[error("Frame processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Recognition,
    Processing,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that ended with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::ConfigError { .. }
            | ScanError::ConfigValidationError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScanError::InvalidInputError { .. } | ScanError::ImageError(_) => {
                ErrorCategory::Input
            }
            ScanError::OcrError { .. } => ErrorCategory::Recognition,
            ScanError::MrzError(_)
            | ScanError::ProcessingError { .. }
            | ScanError::SerializationError(_) => ErrorCategory::Processing,
            ScanError::CsvError(_) | ScanError::ZipError(_) => ErrorCategory::Output,
            ScanError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Recognition => ErrorSeverity::High,
            ErrorCategory::Output | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::OcrError { .. } => {
                "Check that the tesseract binary and the requested language data are installed"
            }
            ScanError::ImageError(_) => "Make sure the input images are readable PNG/JPEG files",
            ScanError::InvalidInputError { .. } => {
                "Pass image files, .json OCR frames, .txt MRZ dumps or directories containing them"
            }
            ScanError::MrzError(_) => "Recapture the document with the MRZ fully inside the guide",
            ScanError::IoError(_) => "Verify the input paths exist and the output path is writable",
            _ if self.category() == ErrorCategory::Configuration => {
                "Review the command line flags or the TOML configuration file"
            }
            _ => "Re-run with --verbose for more details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Recognition => format!("Text recognition failed: {}", self),
            ErrorCategory::Processing => format!("Scan failed: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
