use thiserror::Error;

/// Failure reported by a macro; rendered inline as an error node
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MacroError {
    #[error("expected at least {expected} parameter(s), got {got}")]
    MissingParameter { expected: usize, got: usize },

    #[error("invalid parameter '{value}': {reason}")]
    InvalidParameter { value: String, reason: String },

    #[error("transclusion of '{0}' nested too deeply")]
    TooDeep(String),

    #[error("transclusion of '{0}' is recursive")]
    Recursive(String),

    #[error("{0}")]
    Failed(String),
}

impl MacroError {
    pub fn invalid(value: impl Into<String>, reason: impl Into<String>) -> Self {
        MacroError::InvalidParameter {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type MacroResult<T> = Result<T, MacroError>;
