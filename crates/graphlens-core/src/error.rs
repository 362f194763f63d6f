//! Error taxonomy shared by every engine operation

/// Errors raised by the graph engine.
///
/// Every operation that returns one of these leaves workspace, history and
/// registry state exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Missing or duplicate id, missing edge endpoint, missing command field.
    #[error("{0}")]
    Validation(String),

    /// Malformed filter expression, or a filter attribute no node carries.
    #[error("{0}")]
    Parse(String),

    /// A filter literal that cannot be coerced to the attribute's type.
    #[error("cannot compare '{attribute}': expected {expected}, got '{literal}'")]
    Coercion {
        attribute: String,
        expected: &'static str,
        literal: String,
    },

    /// An operator that is not defined for the attribute's type.
    #[error("incompatible comparison for '{attribute}': {message}")]
    Type { attribute: String, message: String },

    /// Unknown renderer, loader, workspace, node, edge or query.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: &'static str, key: String },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        EngineError::Parse(message.into())
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
