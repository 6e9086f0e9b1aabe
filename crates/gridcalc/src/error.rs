//! Error type for the gridcalc facade

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from any gridcalc crate
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Cell address or range error
    #[error(transparent)]
    Core(#[from] gridcalc_core::Error),

    /// Expression tree error
    #[error(transparent)]
    Formula(#[from] gridcalc_formula::FormulaError),
}
