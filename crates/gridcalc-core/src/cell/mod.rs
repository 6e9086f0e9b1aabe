//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`SheetData`] - Sparse storage for one sheet

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange};
pub use storage::SheetData;
pub use value::{CellError, CellValue, SharedString};
