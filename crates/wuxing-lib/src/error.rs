use thiserror::Error;

/// Errors the engine can raise. The engine is total on well-formed input;
/// both variants indicate either a malformed caller input or a bug in the
/// static table wiring, never a transient condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WuxingError {
    /// Raised before Step 0 runs. No partial `State` is ever produced
    /// alongside this error.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A stage reached an inconsistent table lookup (e.g. a Step-7 grid
    /// coordinate with no matching node). This is a defect in the engine,
    /// not something a caller triggered.
    #[error("internal invariant violated: {detail}")]
    InternalInvariant { detail: String },
}

impl WuxingError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        WuxingError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        WuxingError::InternalInvariant {
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WuxingError>;
