//! Failure kinds of the generator pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed grammar file.
    #[error("{0}")]
    Syntax(String),

    /// Well-formed grammar file describing an invalid grammar (unknown
    /// references, missing alternatives, self left recursion, ...).
    #[error("{0}")]
    Validation(String),

    /// FIRST computation detected left recursion that the elimination pass
    /// should have removed.
    #[error("grammar still contains left recursion")]
    ResidualLeftRecursion,

    /// The FIRST traversal stack hit a non-terminal other than through a
    /// direct self reference.
    #[error("cycle in FIRST set computation")]
    FirstCycle,

    /// The contains-by-value graph of the emitted AST types cannot be
    /// ordered.
    #[error("{0}")]
    AstCycle(String),

    /// Aggregated shift-reduce / reduce-reduce report.
    #[error("{0}")]
    Conflicts(String),

    #[error("failed to {op} file {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
