//! Multi-unit, multi-sheet cell data
//!
//! A *unit* is one workbook-like document. Each unit holds sheets keyed by an
//! opaque sheet id; sheet names are mapped to ids separately.

use ahash::AHashMap;

use crate::cell::{CellValue, SheetData};

/// Cell data for every unit: unit id → sheet id → [`SheetData`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UnitData {
    units: AHashMap<String, AHashMap<String, SheetData>>,
}

impl UnitData {
    /// Create empty unit data
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a sheet
    pub fn sheet(&self, unit_id: &str, sheet_id: &str) -> Option<&SheetData> {
        self.units.get(unit_id).and_then(|u| u.get(sheet_id))
    }

    /// Get a sheet for writing, creating it if needed
    pub fn sheet_mut(&mut self, unit_id: &str, sheet_id: &str) -> &mut SheetData {
        self.units
            .entry(unit_id.to_string())
            .or_default()
            .entry(sheet_id.to_string())
            .or_default()
    }

    /// Check whether a sheet exists
    pub fn contains_sheet(&self, unit_id: &str, sheet_id: &str) -> bool {
        self.sheet(unit_id, sheet_id).is_some()
    }

    /// Get a single cell value
    pub fn get_cell(&self, unit_id: &str, sheet_id: &str, row: u32, col: u16) -> Option<&CellValue> {
        self.sheet(unit_id, sheet_id).and_then(|s| s.get(row, col))
    }

    /// Set a single cell value
    pub fn set_cell(&mut self, unit_id: &str, sheet_id: &str, row: u32, col: u16, value: CellValue) {
        self.sheet_mut(unit_id, sheet_id).set(row, col, value);
    }

    /// Check whether there is no data at all
    pub fn is_empty(&self) -> bool {
        self.units.values().all(|u| u.values().all(SheetData::is_empty))
    }
}

/// Sheet name → sheet id, per unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SheetNameMap {
    units: AHashMap<String, AHashMap<String, String>>,
}

impl SheetNameMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sheet name
    pub fn insert(&mut self, unit_id: &str, sheet_name: &str, sheet_id: &str) {
        self.units
            .entry(unit_id.to_string())
            .or_default()
            .insert(sheet_name.to_string(), sheet_id.to_string());
    }

    /// Resolve a sheet name to its id
    ///
    /// Exact matches win; otherwise names are compared case-insensitively.
    pub fn sheet_id(&self, unit_id: &str, sheet_name: &str) -> Option<&str> {
        let names = self.units.get(unit_id)?;
        if let Some(id) = names.get(sheet_name) {
            return Some(id);
        }
        names
            .iter()
            .find(|(name, _)| name.to_lowercase() == sheet_name.to_lowercase())
            .map(|(_, id)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unit_data_cells() {
        let mut data = UnitData::new();
        assert!(data.is_empty());

        data.set_cell("book", "s1", 0, 0, CellValue::Number(5.0));
        assert_eq!(data.get_cell("book", "s1", 0, 0), Some(&CellValue::Number(5.0)));
        assert_eq!(data.get_cell("book", "s2", 0, 0), None);
        assert_eq!(data.get_cell("other", "s1", 0, 0), None);
        assert!(data.contains_sheet("book", "s1"));
        assert!(!data.is_empty());
    }

    #[test]
    fn test_sheet_name_lookup() {
        let mut names = SheetNameMap::new();
        names.insert("book", "Sheet1", "s1");
        names.insert("book", "Data", "s2");

        assert_eq!(names.sheet_id("book", "Sheet1"), Some("s1"));
        assert_eq!(names.sheet_id("book", "DATA"), Some("s2"));
        assert_eq!(names.sheet_id("book", "Missing"), None);
        assert_eq!(names.sheet_id("other", "Sheet1"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unit_data_from_json() {
        let data: UnitData =
            serde_json::from_str(r##"{"book": {"s1": {"1": {"2": "#N/A"}}}}"##).unwrap();
        assert_eq!(
            data.get_cell("book", "s1", 1, 2),
            Some(&CellValue::Error(crate::CellError::Na))
        );
    }
}
