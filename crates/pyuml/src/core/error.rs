//! Core error types for class extraction and diagram assembly
//!
//! Every fallible library operation reports one of these variants. None of
//! them is retried internally; they surface with enough context (class name,
//! offending value) for the caller to act.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, UmlError>;

/// Core error types for extraction, assembly and drawing
#[derive(Error, Debug)]
pub enum UmlError {
    #[error("Class not found: no declaration of '{class}' in {}", .path.display())]
    NotFound { class: String, path: PathBuf },

    #[error("Invalid stereotype '{value}' (expected class, interface or abstract)")]
    InvalidStereotype { value: String },

    #[error("Render failure: {message}")]
    RenderFailure { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Source unavailable for '{class}': {reason}")]
    SourceUnavailable { class: String, reason: String },

    #[error("Invalid class selector '{input}': {message}")]
    InvalidSelector { input: String, message: String },

    #[error("Invalid relation '{input}': {message}")]
    InvalidRelation { input: String, message: String },

    #[error("Unknown class id {id}")]
    UnknownClass { id: usize },

    #[error("Manifest error: {message}")]
    Manifest { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl UmlError {
    /// Create a new not-found error
    pub fn not_found(class: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            class: class.into(),
            path: path.into(),
        }
    }

    /// Create a new invalid-stereotype error
    pub fn invalid_stereotype(value: impl Into<String>) -> Self {
        Self::InvalidStereotype {
            value: value.into(),
        }
    }

    /// Create a new render failure
    pub fn render_failure(message: impl Into<String>) -> Self {
        Self::RenderFailure {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new source-unavailable error
    pub fn source_unavailable(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            class: class.into(),
            reason: reason.into(),
        }
    }

    /// Create a new manifest error
    pub fn manifest_error(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_stereotype(&self) -> bool {
        matches!(self, Self::InvalidStereotype { .. })
    }

    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::RenderFailure { .. })
    }
}

impl From<serde_json::Error> for UmlError {
    fn from(err: serde_json::Error) -> Self {
        Self::manifest_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_class_and_path() {
        let error = UmlError::not_found("Core", "pkg/core.py");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Class not found"));
        assert!(error_msg.contains("'Core'"));
        assert!(error_msg.contains("pkg/core.py"));
        assert!(error.is_not_found());
    }

    #[test]
    fn test_invalid_stereotype_names_value() {
        let error = UmlError::invalid_stereotype("struct");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("'struct'"));
        assert!(error.is_invalid_stereotype());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_render_failure() {
        let error = UmlError::render_failure("plantuml exited with status 1");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Render failure"));
        assert!(error_msg.contains("status 1"));
        assert!(error.is_render_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: UmlError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: UmlError = json_err.into();
        assert!(format!("{}", error).contains("Manifest error"));
    }
}
