//! Error types for the aitk configuration layer.
//!
//! Errors are split by where they surface: loading/validating configuration,
//! parsing inline prompt directives, and writing generated outputs to disk.

use thiserror::Error;

/// Top-level error type for aitk operations.
#[derive(Error, Debug)]
pub enum ToolkitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Prompt directive parsing errors
    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),

    /// Image encoding/writing errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither an explicit output path nor an output folder was given
    #[error("output_path or output_folder must be specified")]
    MissingOutput,

    /// A mandatory field was absent or empty
    #[error("{0} must be specified")]
    MissingField(String),

    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while applying `--flag value` directives from a prompt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    /// Directive content could not be coerced to the flag's value type
    #[error("malformed --{flag} directive: expected {expected}, got {content:?}")]
    Malformed {
        flag: String,
        content: String,
        expected: &'static str,
    },
}

/// Convenience type alias for aitk results.
pub type Result<T> = std::result::Result<T, ToolkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_output_message() {
        let err = ToolkitError::from(ConfigError::MissingOutput);
        assert!(err
            .to_string()
            .contains("output_path or output_folder must be specified"));
    }

    #[test]
    fn test_malformed_directive_names_flag_and_content() {
        let err = DirectiveError::Malformed {
            flag: "w".to_string(),
            content: "wide".to_string(),
            expected: "an integer",
        };
        let msg = err.to_string();
        assert!(msg.contains("--w"));
        assert!(msg.contains("\"wide\""));
    }
}
