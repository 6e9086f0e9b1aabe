//! Evaluation context
//!
//! [`EvalConfig`] holds what is fixed for a calculation pass (sheet names,
//! static cell data, settings). [`EvalRuntimeState`] holds the current
//! position and the cells computed so far in the pass. Both are shared with
//! reference values through `Arc` snapshots: updating the runtime state
//! copies on write, so references that already captured a snapshot keep
//! seeing it.

use std::sync::Arc;

use gridcalc_core::{CellValue, SheetNameMap, UnitData};
use serde::Deserialize;

use crate::value::ReferenceData;

/// Engine-wide settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Dates are counted from 1904-01-01 instead of 1900-01-01
    pub date_1904: bool,
}

/// Configuration fixed for the duration of a pass
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvalConfig {
    pub sheet_names: Arc<SheetNameMap>,
    pub unit_data: Arc<UnitData>,
    pub array_formula_data: Arc<UnitData>,
    pub settings: EngineSettings,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_names(mut self, sheet_names: SheetNameMap) -> Self {
        self.sheet_names = Arc::new(sheet_names);
        self
    }

    pub fn with_unit_data(mut self, unit_data: UnitData) -> Self {
        self.unit_data = Arc::new(unit_data);
        self
    }

    pub fn with_array_formula_data(mut self, data: UnitData) -> Self {
        self.array_formula_data = Arc::new(data);
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// State that changes while a pass runs
#[derive(Debug, Clone, Default)]
pub struct EvalRuntimeState {
    pub unit_id: String,
    pub sheet_id: String,
    pub row: u32,
    pub column: u16,
    runtime_data: Arc<UnitData>,
    runtime_array_formula_data: Arc<UnitData>,
    runtime_feature_data: Arc<UnitData>,
}

impl EvalRuntimeState {
    pub fn new(unit_id: &str, sheet_id: &str) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            sheet_id: sheet_id.to_string(),
            ..Self::default()
        }
    }

    /// Move to the cell being calculated
    pub fn set_current(&mut self, unit_id: &str, sheet_id: &str, row: u32, column: u16) {
        if self.unit_id != unit_id {
            self.unit_id = unit_id.to_string();
        }
        if self.sheet_id != sheet_id {
            self.sheet_id = sheet_id.to_string();
        }
        self.row = row;
        self.column = column;
    }

    /// Record a computed cell
    pub fn set_runtime_data(&mut self, unit_id: &str, sheet_id: &str, row: u32, column: u16, value: CellValue) {
        Arc::make_mut(&mut self.runtime_data).set_cell(unit_id, sheet_id, row, column, value);
    }

    /// Record a cell produced by spilling an array result
    pub fn set_runtime_array_formula_data(
        &mut self,
        unit_id: &str,
        sheet_id: &str,
        row: u32,
        column: u16,
        value: CellValue,
    ) {
        Arc::make_mut(&mut self.runtime_array_formula_data).set_cell(unit_id, sheet_id, row, column, value);
    }

    /// Replace the cells injected by features
    pub fn set_runtime_feature_data(&mut self, data: UnitData) {
        self.runtime_feature_data = Arc::new(data);
    }

    pub fn runtime_data(&self) -> &UnitData {
        &self.runtime_data
    }

    pub fn runtime_array_formula_data(&self) -> &UnitData {
        &self.runtime_array_formula_data
    }

    pub fn runtime_feature_data(&self) -> &UnitData {
        &self.runtime_feature_data
    }

    /// Forget everything computed in the pass
    pub fn clear_runtime_data(&mut self) {
        self.runtime_data = Arc::default();
        self.runtime_array_formula_data = Arc::default();
    }

    /// Position information handed to function executors
    pub fn function_context(&self, config: &EvalConfig) -> FunctionContext {
        FunctionContext {
            unit_id: self.unit_id.clone(),
            sheet_id: self.sheet_id.clone(),
            row: self.row,
            column: self.column,
            date_1904: config.settings.date_1904,
        }
    }
}

/// Where a function is being called from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionContext {
    pub unit_id: String,
    pub sheet_id: String,
    pub row: u32,
    pub column: u16,
    pub date_1904: bool,
}

impl FunctionContext {
    /// Context at A1 of an unnamed sheet (for testing)
    pub fn simple() -> Self {
        Self::default()
    }
}

/// Everything a tree needs to execute
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub config: &'a EvalConfig,
    pub runtime: &'a EvalRuntimeState,
}

impl<'a> EvalContext<'a> {
    pub fn new(config: &'a EvalConfig, runtime: &'a EvalRuntimeState) -> Self {
        Self { config, runtime }
    }

    /// Data snapshots attached to references
    pub fn reference_data(&self) -> ReferenceData {
        ReferenceData {
            sheet_names: Arc::clone(&self.config.sheet_names),
            unit_data: Arc::clone(&self.config.unit_data),
            array_formula_data: Arc::clone(&self.config.array_formula_data),
            runtime_data: Arc::clone(&self.runtime.runtime_data),
            runtime_array_formula_data: Arc::clone(&self.runtime.runtime_array_formula_data),
            runtime_feature_data: Arc::clone(&self.runtime.runtime_feature_data),
        }
    }

    pub fn function_context(&self) -> FunctionContext {
        self.runtime.function_context(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_json() {
        let config: EvalConfig = serde_json::from_str(
            r#"{
                "sheetNames": {"book": {"Sheet1": "s1"}},
                "unitData": {"book": {"s1": {"0": {"0": 5}}}},
                "settings": {"date1904": true}
            }"#,
        )
        .unwrap();
        assert!(config.settings.date_1904);
        assert_eq!(config.sheet_names.sheet_id("book", "sheet1"), Some("s1"));
        assert_eq!(config.unit_data.get_cell("book", "s1", 0, 0), Some(&CellValue::Number(5.0)));
        assert!(config.array_formula_data.is_empty());
    }

    #[test]
    fn test_snapshots_are_copy_on_write() {
        let config = EvalConfig::new();
        let mut runtime = EvalRuntimeState::new("book", "s1");
        runtime.set_runtime_data("book", "s1", 0, 0, CellValue::Number(1.0));

        let before = EvalContext::new(&config, &runtime).reference_data();
        runtime.set_runtime_data("book", "s1", 0, 0, CellValue::Number(2.0));

        assert_eq!(before.runtime_data.get_cell("book", "s1", 0, 0), Some(&CellValue::Number(1.0)));
        assert_eq!(
            runtime.runtime_data().get_cell("book", "s1", 0, 0),
            Some(&CellValue::Number(2.0))
        );
    }

    #[test]
    fn test_function_context() {
        let config = EvalConfig::new().with_settings(EngineSettings { date_1904: true });
        let mut runtime = EvalRuntimeState::new("book", "s1");
        runtime.set_current("book", "s2", 4, 3);
        let ctx = EvalContext::new(&config, &runtime).function_context();
        assert_eq!(
            ctx,
            FunctionContext {
                unit_id: "book".into(),
                sheet_id: "s2".into(),
                row: 4,
                column: 3,
                date_1904: true,
            }
        );
    }
}
