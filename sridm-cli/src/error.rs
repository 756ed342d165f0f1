//! CLI-specific error types and exit code mapping

use sridm_analyzer::AnalyzerError;
use sridm_core::error::{ParseError, SridmError};

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The IDi pattern is not a valid regular expression.
    #[error("invalid IDi pattern: {0}")]
    InvalidPattern(String),

    /// Message extraction stopped (malformed header, broken pipeline).
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from sridm-core.
    #[error("{0}")]
    Core(#[from] SridmError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success (including zero matches)     |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Invalid IDi pattern                  |
    /// | 4    | Fatal extraction error               |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(SridmError::Config(_)) => 2,
            Self::InvalidPattern(_) | Self::Core(SridmError::Parse(ParseError::Pattern(_))) => 3,
            Self::Extraction(_)
            | Self::Core(SridmError::Parse(ParseError::Header { .. }))
            | Self::Core(SridmError::Pipeline(_)) => 4,
            Self::Io(_) | Self::Core(SridmError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<AnalyzerError> for CliError {
    fn from(e: AnalyzerError) -> Self {
        match e {
            AnalyzerError::InvalidPattern(re) => Self::InvalidPattern(re.to_string()),
            AnalyzerError::Config { field, reason } => Self::Config(format!("{field}: {reason}")),
            AnalyzerError::Io(io) => Self::Io(io),
            e @ (AnalyzerError::Parse { .. } | AnalyzerError::Channel(_)) => {
                Self::Extraction(e.to_string())
            }
            other => Self::Command(other.to_string()),
        }
    }
}
