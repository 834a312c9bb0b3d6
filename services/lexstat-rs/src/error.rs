//! Error types for cognate detection.

use thiserror::Error;

/// Errors that abort a specific call.
///
/// Malformed wordlist entries are not represented here: they are collected
/// as [`crate::report::MalformedEntry`] records and never abort a run.
#[derive(Debug, Error)]
pub enum LexStatError {
    /// Wordlist header lacks a required column.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing column
        field: String,
    },

    /// Two entries share one identifier.
    #[error("Duplicate entry identifier: {id}")]
    DuplicateEntry { id: String },

    /// Unknown method, linkage, aggregate or frequency selector.
    #[error("Invalid {kind} '{name}', expected one of: {expected}")]
    InvalidMethod {
        /// What was being selected ("method", "linkage", ...)
        kind: &'static str,
        name: String,
        expected: &'static str,
    },

    /// Operation requested before its inputs were built.
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    #[error("Unknown doculect: {0}")]
    UnknownDoculect(String),

    /// No cluster assignment stored under this reference name.
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {message}")]
    Config { message: String },
}

impl LexStatError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_method(
        kind: &'static str,
        name: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidMethod {
            kind,
            name: name.into(),
            expected,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for LexStatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LexStatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LexStatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LexStatError::invalid_method("method", "fuzzy", "lexstat, sca");
        assert_eq!(
            err.to_string(),
            "Invalid method 'fuzzy', expected one of: lexstat, sca"
        );

        let err = LexStatError::missing_field("concept");
        assert!(err.to_string().contains("concept"));

        let err = LexStatError::precondition("scorer not built");
        assert!(matches!(err, LexStatError::Precondition { .. }));
    }
}
