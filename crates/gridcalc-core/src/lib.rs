//! # gridcalc-core
//!
//! Core cell data structures for the gridcalc formula engine.
//!
//! This crate provides the storage-level types the evaluator reads from:
//! - [`CellValue`] and [`CellError`] - Raw cell values and error codes
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`SheetData`], [`UnitData`] and [`SheetNameMap`] - Sparse multi-sheet cell data
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellRange, CellValue, UnitData};
//!
//! let mut data = UnitData::new();
//! data.set_cell("book", "sheet1", 0, 0, CellValue::Number(42.0));
//!
//! let range = CellRange::parse("A1:B2").unwrap();
//! assert_eq!(range.cell_count(), 4);
//! assert_eq!(data.get_cell("book", "sheet1", 0, 0), Some(&CellValue::Number(42.0)));
//! ```

pub mod cell;
pub mod error;
pub mod unit;

pub use cell::{CellAddress, CellError, CellRange, CellValue, SharedString, SheetData};
pub use error::{Error, Result};
pub use unit::{SheetNameMap, UnitData};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;
