//! Formula error types
//!
//! These cover programmer and construction errors. Spreadsheet-level failures
//! (`#N/A`, `#VALUE!`, ...) are never raised; they travel as
//! [`ValueObject::Error`](crate::value::ValueObject::Error).

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while building or walking an expression tree
#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Reference token that does not describe a range
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Literal token that could not be turned into a value
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// Node id not present in the tree
    #[error("Invalid node id: {0}")]
    InvalidNode(usize),

    /// Address or range error from the core crate
    #[error(transparent)]
    Core(#[from] gridcalc_core::Error),
}
