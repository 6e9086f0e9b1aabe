//! Sequential calculation pass
//!
//! Evaluates formula cells in the order the caller gives them. After each
//! cell its result is written into the runtime data, so later formulas see
//! it through their references. Dependency ordering is the caller's job.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut data = UnitData::new();
//! data.set_cell("book", "s1", 0, 0, CellValue::Number(10.0));
//! let config = EvalConfig::new().with_unit_data(data);
//!
//! let builder = AstBuilder::new(FunctionRegistry::builtins());
//! // B1 = A1*2, C1 = B1+1
//! let double = LexerItem::node("*", vec![LexerItem::token("A1"), LexerItem::token("2")]);
//! let next = LexerItem::node("+", vec![LexerItem::token("B1"), LexerItem::token("1")]);
//! let mut cells = vec![
//!     FormulaCell::build(&builder, "book", "s1", 0, 1, &double).unwrap(),
//!     FormulaCell::build(&builder, "book", "s1", 0, 2, &next).unwrap(),
//! ];
//!
//! let mut pass = CalculationPass::new(&config);
//! let stats = pass.calculate(&mut cells).unwrap();
//! assert_eq!(stats.cells_calculated, 2);
//! assert_eq!(cells[1].value(), Some(&ValueObject::Number(21.0)));
//! ```

use gridcalc_core::{CellError, CellValue, MAX_COLS, MAX_ROWS};
use gridcalc_formula::{
    AstBuilder, AstTree, EvalConfig, EvalContext, EvalRuntimeState, LexerItem, NodeId, ValueObject,
};

use crate::Result;

/// A formula and the cell it belongs to
#[derive(Debug, Clone)]
pub struct FormulaCell {
    pub unit_id: String,
    pub sheet_id: String,
    pub row: u32,
    pub column: u16,
    tree: AstTree,
    root: NodeId,
    value: Option<ValueObject>,
}

impl FormulaCell {
    pub fn new(unit_id: &str, sheet_id: &str, row: u32, column: u16, tree: AstTree, root: NodeId) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            sheet_id: sheet_id.to_string(),
            row,
            column,
            tree,
            root,
            value: None,
        }
    }

    /// Build the tree for `item` and place it at a cell
    pub fn build(
        builder: &AstBuilder<'_>,
        unit_id: &str,
        sheet_id: &str,
        row: u32,
        column: u16,
        item: &LexerItem,
    ) -> Result<Self> {
        let (tree, root) = builder.build(item)?;
        Ok(Self::new(unit_id, sheet_id, row, column, tree, root))
    }

    pub fn tree(&self) -> &AstTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Result of the last pass, with references resolved
    pub fn value(&self) -> Option<&ValueObject> {
        self.value.as_ref()
    }
}

/// Statistics from a calculation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Number of formula cells in the pass
    pub formula_count: usize,
    /// Number of cells calculated
    pub cells_calculated: usize,
    /// Number of cells whose result is an error value
    pub errors: usize,
    /// Number of cells filled by array results, anchors included
    pub spilled_cells: usize,
}

/// Runs formula cells one after another against a fixed configuration
#[derive(Debug)]
pub struct CalculationPass<'c> {
    config: &'c EvalConfig,
    runtime: EvalRuntimeState,
}

impl<'c> CalculationPass<'c> {
    pub fn new(config: &'c EvalConfig) -> Self {
        Self {
            config,
            runtime: EvalRuntimeState::default(),
        }
    }

    /// Start from existing runtime state, e.g. one carrying feature data
    pub fn with_runtime(config: &'c EvalConfig, runtime: EvalRuntimeState) -> Self {
        Self { config, runtime }
    }

    pub fn runtime(&self) -> &EvalRuntimeState {
        &self.runtime
    }

    pub fn into_runtime(self) -> EvalRuntimeState {
        self.runtime
    }

    /// Evaluate every cell synchronously
    ///
    /// Async results are stored as `#GETTING_DATA`.
    pub fn calculate(&mut self, cells: &mut [FormulaCell]) -> Result<CalculationStats> {
        let mut stats = self.begin(cells.len());
        for cell in cells.iter_mut() {
            self.enter(cell);
            let value = {
                let ctx = EvalContext::new(self.config, &self.runtime);
                cell.tree.execute(cell.root, &ctx)
            };
            self.finish(cell, value, &mut stats);
        }
        Ok(stats)
    }

    /// Evaluate every cell, awaiting async results before moving on
    pub async fn calculate_async(&mut self, cells: &mut [FormulaCell]) -> Result<CalculationStats> {
        let mut stats = self.begin(cells.len());
        for cell in cells.iter_mut() {
            self.enter(cell);
            let value = {
                let ctx = EvalContext::new(self.config, &self.runtime);
                cell.tree.execute_async(cell.root, &ctx).await
            };
            self.finish(cell, value, &mut stats);
        }
        Ok(stats)
    }

    fn begin(&mut self, formula_count: usize) -> CalculationStats {
        log::debug!("calculating {} formula cell(s)", formula_count);
        self.runtime.clear_runtime_data();
        CalculationStats {
            formula_count,
            ..CalculationStats::default()
        }
    }

    fn enter(&mut self, cell: &mut FormulaCell) {
        self.runtime.set_current(&cell.unit_id, &cell.sheet_id, cell.row, cell.column);
        cell.tree.reset();
    }

    fn finish(
        &mut self,
        cell: &mut FormulaCell,
        value: gridcalc_formula::FormulaResult<ValueObject>,
        stats: &mut CalculationStats,
    ) {
        let value = match value {
            Ok(value) => value.materialize(),
            Err(e) => {
                log::warn!(
                    "evaluation failed at {}!({}, {}): {}",
                    cell.sheet_id,
                    cell.row,
                    cell.column,
                    e
                );
                ValueObject::Error(CellError::Value)
            }
        };

        let value = match value {
            ValueObject::Array(array) => match array.single() {
                Some(single) => single.clone(),
                None => ValueObject::Array(array),
            },
            other => other,
        };

        if let ValueObject::Array(array) = &value {
            match self.spill(cell, array) {
                Some(count) => stats.spilled_cells += count,
                None => {
                    log::debug!("array result at {}!({}, {}) is blocked", cell.sheet_id, cell.row, cell.column);
                    self.store(cell, CellValue::Error(CellError::Spill));
                    stats.errors += 1;
                }
            }
        } else {
            let stored = value.to_cell_value();
            if stored.is_error() {
                stats.errors += 1;
            }
            self.store(cell, stored);
        }

        cell.value = Some(value);
        stats.cells_calculated += 1;
    }

    fn store(&mut self, cell: &FormulaCell, value: CellValue) {
        self.runtime
            .set_runtime_data(&cell.unit_id, &cell.sheet_id, cell.row, cell.column, value);
    }

    /// Write an array result across the cells below and right of its anchor
    ///
    /// Returns the number of cells written, or `None` when the area leaves the
    /// sheet or covers a non-empty cell.
    fn spill(&mut self, cell: &FormulaCell, array: &gridcalc_formula::ArrayValue) -> Option<usize> {
        let last_row = u64::from(cell.row) + array.row_count() as u64;
        let last_column = u64::from(cell.column) + array.column_count() as u64;
        if last_row > u64::from(MAX_ROWS) || last_column > u64::from(MAX_COLS) {
            return None;
        }

        let blocked = array.iter().any(|(r, c, _)| {
            let (row, column) = (cell.row + r as u32, cell.column + c as u16);
            (r, c) != (0, 0) && self.is_occupied(&cell.unit_id, &cell.sheet_id, row, column)
        });
        if blocked {
            return None;
        }

        for (r, c, element) in array.iter() {
            let (row, column) = (cell.row + r as u32, cell.column + c as u16);
            self.runtime.set_runtime_array_formula_data(
                &cell.unit_id,
                &cell.sheet_id,
                row,
                column,
                element.to_cell_value(),
            );
        }
        if let Some(anchor) = array.get(0, 0) {
            self.store(cell, anchor.to_cell_value());
        }
        Some(array.len())
    }

    fn is_occupied(&self, unit_id: &str, sheet_id: &str, row: u32, column: u16) -> bool {
        [
            &*self.config.unit_data,
            self.runtime.runtime_data(),
            self.runtime.runtime_array_formula_data(),
        ]
        .iter()
        .any(|data| {
            data.get_cell(unit_id, sheet_id, row, column)
                .map_or(false, |v| !v.is_empty())
        })
    }
}
