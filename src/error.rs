/// Error types for policy loading and configuration
use crate::parser::SyntaxError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for crate operations
///
/// Syntax errors inside a document are not raised through this type; they are
/// collected by the parser and only surface here when a caller asks for a
/// rejected policy to become a hard failure.
#[derive(Error, Debug)]
pub enum SfplError {
    /// IO operation on a policy or configuration file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing failed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Policy file has syntax errors
    #[error("{}", rejected_message(.path, .errors))]
    PolicyRejected {
        /// File that failed
        path: PathBuf,
        /// Every syntax error found in it
        errors: Vec<SyntaxError>,
    },

    /// Background parse task failed
    #[error("Runtime error: {0}")]
    Runtime(String),
}

fn rejected_message(path: &Path, errors: &[SyntaxError]) -> String {
    let mut msg = format!(
        "Policy rejected: {} has {} syntax error(s)",
        path.display(),
        errors.len()
    );
    for err in errors {
        msg.push_str(&format!("\n  {}:{}", path.display(), err));
    }
    msg
}

impl SfplError {
    /// Create an IO error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a rejected policy error
    pub fn rejected(path: impl Into<PathBuf>, errors: Vec<SyntaxError>) -> Self {
        Self::PolicyRejected {
            path: path.into(),
            errors,
        }
    }
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, SfplError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;
    use crate::parser::SyntaxErrorKind;

    #[test]
    fn test_error_display() {
        let err = SfplError::configuration("no extensions");
        assert_eq!(err.to_string(), "Invalid configuration: no extensions");

        let err = SfplError::io(
            "rules/missing.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "IO error on rules/missing.yaml: not found");
    }

    #[test]
    fn test_rejected_lists_every_error() {
        let err = SfplError::rejected(
            "rules/bad.yaml",
            vec![
                SyntaxError::new(SyntaxErrorKind::EmptyDocument, Span::new(0, 0, 1, 1)),
                SyntaxError::new(
                    SyntaxErrorKind::NestingTooDeep { limit: 2 },
                    Span::new(5, 6, 2, 3),
                ),
            ],
        );
        let display = err.to_string();
        assert!(display.starts_with("Policy rejected: rules/bad.yaml has 2 syntax error(s)"));
        assert!(display.contains("rules/bad.yaml:1:1: policy document contains no declarations"));
        assert!(display.contains("rules/bad.yaml:2:3: nesting depth limit exceeded"));
    }
}
