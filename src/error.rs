use thiserror::Error;

use crate::builder::Operation;

pub type Result<T> = std::result::Result<T, Error>;

/// Validation errors detected while compiling a statement.
///
/// Every variant is raised before any SQL could be executed; there is no
/// partial-success state. When a build returns an error the statement text
/// and bound values must be treated as unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("join conditions are wrong: expected 1, 2 or 4 arguments, got {0}")]
    JoinArity(usize),

    #[error("invalid where condition: {0}")]
    InvalidCondition(&'static str),

    #[error("unknown operator `{0}` in where condition")]
    UnknownOperator(String),

    #[error("`{0}` expects a sequence operand")]
    ExpectedSequence(&'static str),

    #[error("insert and update require mutation data")]
    MissingData,

    #[error("invalid mutation data: {0}")]
    InvalidData(&'static str),

    #[error("refusing to {0} without a where clause, use force() to override")]
    MissingWhere(Operation),

    #[error("unknown driver `{0}`")]
    UnknownDriver(String),
}

/// Log the error on its way out, so the caller's logger sees the same
/// message the returned error carries.
pub(crate) fn fail<T>(error: Error) -> Result<T> {
    tracing::error!("{error}");
    Err(error)
}
