//! Reference value objects

use std::fmt;
use std::sync::Arc;

use gridcalc_core::{CellError, CellRange, SheetNameMap, UnitData, MAX_COLS, MAX_ROWS};
use lazy_regex::regex_captures;

use super::{ArrayOrigin, ArrayValue, ValueObject};
use crate::error::{FormulaError, FormulaResult};

/// Everything a reference needs to read cells
///
/// Snapshots are shared: attaching data to a reference never copies cells.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// Sheet name → sheet id
    pub sheet_names: Arc<SheetNameMap>,
    /// Static cell data
    pub unit_data: Arc<UnitData>,
    /// Static array-formula (spill) cell data
    pub array_formula_data: Arc<UnitData>,
    /// Cells computed earlier in the current pass
    pub runtime_data: Arc<UnitData>,
    /// Spill cells computed earlier in the current pass
    pub runtime_array_formula_data: Arc<UnitData>,
    /// Cells injected by features during the pass
    pub runtime_feature_data: Arc<UnitData>,
}

impl ReferenceData {
    /// Data sources in lookup precedence, highest first
    fn sources(&self) -> [&UnitData; 5] {
        [
            &self.runtime_data,
            &self.runtime_array_formula_data,
            &self.runtime_feature_data,
            &self.unit_data,
            &self.array_formula_data,
        ]
    }
}

/// A pointer at a block of cells, resolved lazily
#[derive(Debug, Clone)]
pub struct ReferenceValue {
    token: String,
    unit_id: String,
    sheet_id: String,
    forced_sheet_name: Option<String>,
    range: CellRange,
    data: Option<ReferenceData>,
}

impl ReferenceValue {
    /// Reference to a range on the current sheet
    pub fn new(range: CellRange) -> Self {
        Self {
            token: range.to_a1_string(),
            unit_id: String::new(),
            sheet_id: String::new(),
            forced_sheet_name: None,
            range,
            data: None,
        }
    }

    /// Parse a reference token
    ///
    /// Accepts `A1`, `$A$1:B2`, `A:C`, `2:5`, and any of these prefixed by a
    /// sheet name (`Sheet1!A1`, `'My Sheet'!A1:B2`).
    pub fn parse(token: &str) -> FormulaResult<Self> {
        let trimmed = token.trim();
        let invalid = || FormulaError::InvalidReference(token.to_string());

        let (sheet_name, address) =
            match regex_captures!(r"^(?:'((?:[^']|'')+)'|([^'!]+))!(.+)$", trimmed) {
                Some((_, quoted, plain, address)) => {
                    let name = if quoted.is_empty() {
                        plain.to_string()
                    } else {
                        quoted.replace("''", "'")
                    };
                    (Some(name), address)
                }
                None => (None, trimmed),
            };

        if address.contains('!') {
            return Err(invalid());
        }
        let range = CellRange::parse(address).map_err(|_| invalid())?;

        Ok(Self {
            token: trimmed.to_string(),
            unit_id: String::new(),
            sheet_id: String::new(),
            forced_sheet_name: sheet_name,
            range,
            data: None,
        })
    }

    /// Whether `token` reads as a reference
    pub fn is_reference_token(token: &str) -> bool {
        Self::parse(token).is_ok()
    }

    /// Set the unit and sheet the reference is evaluated from
    pub fn with_location(mut self, unit_id: &str, sheet_id: &str) -> Self {
        self.unit_id = unit_id.to_string();
        self.sheet_id = sheet_id.to_string();
        self
    }

    /// Attach the data snapshots used for resolution
    pub fn with_data(mut self, data: ReferenceData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn set_data(&mut self, data: ReferenceData) {
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&ReferenceData> {
        self.data.as_ref()
    }

    /// Same reference over a different range
    pub fn with_range(mut self, range: CellRange) -> Self {
        self.token = match &self.forced_sheet_name {
            Some(name) => format!("{}!{}", quote_sheet_name(name), range.to_a1_string()),
            None => range.to_a1_string(),
        };
        self.range = range;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    /// Sheet name written in the token, if any
    pub fn forced_sheet_name(&self) -> Option<&str> {
        self.forced_sheet_name.as_deref()
    }

    pub fn range(&self) -> &CellRange {
        &self.range
    }

    pub fn row_count(&self) -> usize {
        self.range.row_count() as usize
    }

    pub fn column_count(&self) -> usize {
        self.range.col_count() as usize
    }

    pub fn is_vector(&self) -> bool {
        self.range.is_vector()
    }

    /// Sheet id the reference points at
    ///
    /// A sheet name in the token is resolved through the sheet-name map;
    /// `None` means the name is unknown.
    pub fn resolve_sheet_id(&self) -> Option<String> {
        match &self.forced_sheet_name {
            None => Some(self.sheet_id.clone()),
            Some(name) => self
                .data
                .as_ref()
                .and_then(|d| d.sheet_names.sheet_id(&self.unit_id, name))
                .map(str::to_string),
        }
    }

    /// Value of one cell, looking through the data sources in precedence order
    pub fn cell_value(&self, sheet_id: &str, row: u32, column: u16) -> ValueObject {
        let Some(data) = &self.data else {
            return ValueObject::Null;
        };
        data.sources()
            .into_iter()
            .find_map(|source| source.get_cell(&self.unit_id, sheet_id, row, column))
            .map(ValueObject::from)
            .unwrap_or(ValueObject::Null)
    }

    /// Materialize the referenced block into an array
    ///
    /// Whole-row and whole-column ranges are clipped to the used area.
    /// An unknown sheet name yields `#REF!`.
    pub fn to_array_value(&self) -> ValueObject {
        let Some(sheet_id) = self.resolve_sheet_id() else {
            return ValueObject::Error(CellError::Ref);
        };
        let range = self.clipped_range(&sheet_id);

        let rows = (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.cell_value(&sheet_id, row, col))
                    .collect()
            })
            .collect();

        let array = ArrayValue::new(rows).with_origin(ArrayOrigin {
            unit_id: self.unit_id.clone(),
            sheet_id,
            row: range.start.row,
            column: range.start.col,
        });
        ValueObject::Array(array)
    }

    fn clipped_range(&self, sheet_id: &str) -> CellRange {
        let full_columns = self.range.row_count() == MAX_ROWS;
        let full_rows = self.range.col_count() == MAX_COLS;
        if !full_columns && !full_rows {
            return self.range;
        }

        let mut used_row = 0u32;
        let mut used_col = 0u16;
        if let Some(data) = &self.data {
            for source in data.sources() {
                if let Some((_, _, max_row, max_col)) = source
                    .sheet(&self.unit_id, sheet_id)
                    .and_then(|s| s.used_bounds())
                {
                    used_row = used_row.max(max_row);
                    used_col = used_col.max(max_col);
                }
            }
        }

        let mut range = self.range;
        if full_columns {
            range.end.row = used_row.clamp(range.start.row, range.end.row);
        }
        if full_rows {
            range.end.col = used_col.clamp(range.start.col, range.end.col);
        }
        range
    }
}

fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

impl PartialEq for ReferenceValue {
    fn eq(&self, other: &Self) -> bool {
        self.unit_id == other.unit_id
            && self.sheet_id == other.sheet_id
            && self.forced_sheet_name == other.forced_sheet_name
            && self.range == other.range
    }
}

impl fmt::Display for ReferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}
