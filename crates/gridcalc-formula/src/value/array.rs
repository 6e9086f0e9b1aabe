//! Array value objects

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use gridcalc_core::CellError;

use super::ValueObject;
use crate::error::{FormulaError, FormulaResult};

/// Where an array was read from
///
/// Set for arrays materialized from a reference; arrays produced by literals
/// or calculations have no origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ArrayOrigin {
    pub unit_id: String,
    pub sheet_id: String,
    /// Row of the top-left cell
    pub row: u32,
    /// Column of the top-left cell
    pub column: u16,
}

/// A row-major grid of scalar value objects
///
/// Elements are always scalars (Null, Number, String, Boolean, Error); every
/// row has `column_count` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    rows: Arc<Vec<Vec<ValueObject>>>,
    row_count: usize,
    column_count: usize,
    origin: Option<ArrayOrigin>,
}

impl ArrayValue {
    /// Create an array from rows
    ///
    /// Short rows are padded with blanks. Non-scalar elements are reduced: a
    /// 1x1 array becomes its element, anything else `#VALUE!`.
    pub fn new(rows: Vec<Vec<ValueObject>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        if column_count == 0 {
            return Self::empty();
        }

        let rows: Vec<Vec<ValueObject>> = rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<ValueObject> = row.into_iter().map(normalize_element).collect();
                row.resize(column_count, ValueObject::Null);
                row
            })
            .collect();

        Self {
            row_count: rows.len(),
            column_count,
            rows: Arc::new(rows),
            origin: None,
        }
    }

    /// An array with no cells
    pub fn empty() -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            row_count: 0,
            column_count: 0,
            origin: None,
        }
    }

    /// A 1x1 array
    pub fn from_scalar(value: ValueObject) -> Self {
        Self::new(vec![vec![value]])
    }

    /// A `rows` x `columns` array with every cell set to `value`
    pub fn filled(rows: usize, columns: usize, value: ValueObject) -> Self {
        Self::new(vec![vec![value; columns]; rows])
    }

    /// A single-column array
    pub fn from_column(values: Vec<ValueObject>) -> Self {
        Self::new(values.into_iter().map(|v| vec![v]).collect())
    }

    /// A single-row array
    pub fn from_row(values: Vec<ValueObject>) -> Self {
        Self::new(vec![values])
    }

    /// Attach the originating range position
    pub fn with_origin(mut self, origin: ArrayOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn origin(&self) -> Option<&ArrayOrigin> {
        self.origin.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.row_count * self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single row or single column
    pub fn is_vector(&self) -> bool {
        !self.is_empty() && (self.row_count == 1 || self.column_count == 1)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&ValueObject> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn rows(&self) -> &[Vec<ValueObject>] {
        &self.rows
    }

    /// The only element of a 1x1 array
    pub fn single(&self) -> Option<&ValueObject> {
        if self.row_count == 1 && self.column_count == 1 {
            self.get(0, 0)
        } else {
            None
        }
    }

    /// Elements in row-major order
    pub fn values(&self) -> impl Iterator<Item = &ValueObject> {
        self.rows.iter().flat_map(|row| row.iter())
    }

    /// Elements with their (row, column) position, row-major
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &ValueObject)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, v)| (r, c, v)))
    }

    /// Index along the long axis of a vector
    pub fn vector_index(&self, row: usize, column: usize) -> usize {
        if self.row_count == 1 {
            column
        } else {
            row
        }
    }

    /// Element `index` along the long axis of a vector
    pub fn vector_get(&self, index: usize) -> Option<&ValueObject> {
        if self.row_count == 1 {
            self.get(0, index)
        } else {
            self.get(index, 0)
        }
    }

    /// Length of the long axis
    pub fn vector_len(&self) -> usize {
        self.row_count.max(self.column_count)
    }

    /// Apply `f` to every element; the origin is kept
    pub fn map<F>(&self, mut f: F) -> ArrayValue
    where
        F: FnMut(&ValueObject) -> ValueObject,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(&mut f).collect())
            .collect();
        let mut result = ArrayValue::new(rows);
        result.origin = self.origin.clone();
        result
    }

    /// Combine with another value cell by cell
    ///
    /// Single-row and single-column operands stretch to the other operand's
    /// size. Positions that fall outside an operand that cannot stretch yield
    /// `#N/A`.
    pub fn broadcast<F>(&self, other: &ValueObject, f: &F) -> ArrayValue
    where
        F: Fn(&ValueObject, &ValueObject) -> ValueObject,
    {
        let other = match other {
            ValueObject::Array(a) => a.clone(),
            scalar => ArrayValue::from_scalar(scalar.clone()),
        };
        if self.is_empty() || other.is_empty() {
            return ArrayValue::from_scalar(ValueObject::Error(CellError::Value));
        }

        let row_count = self.row_count.max(other.row_count);
        let column_count = self.column_count.max(other.column_count);

        let rows = (0..row_count)
            .map(|r| {
                (0..column_count)
                    .map(|c| match (self.stretched(r, c), other.stretched(r, c)) {
                        (Some(a), Some(b)) => f(a, b),
                        _ => ValueObject::Error(CellError::Na),
                    })
                    .collect()
            })
            .collect();
        ArrayValue::new(rows)
    }

    fn stretched(&self, row: usize, column: usize) -> Option<&ValueObject> {
        let r = if self.row_count == 1 { 0 } else { row };
        let c = if self.column_count == 1 { 0 } else { column };
        self.get(r, c)
    }

    /// Sum of the numbers; the first error element is returned instead
    pub fn sum(&self) -> ValueObject {
        let mut total = 0.0;
        for value in self.values() {
            match value {
                ValueObject::Number(n) => total += n,
                ValueObject::Error(e) => return ValueObject::Error(*e),
                _ => {}
            }
        }
        ValueObject::Number(total)
    }

    /// Number of numeric elements
    pub fn count(&self) -> ValueObject {
        let count = self
            .values()
            .filter(|v| matches!(v, ValueObject::Number(_)))
            .count();
        ValueObject::Number(count as f64)
    }

    /// Number of non-blank elements
    pub fn counta(&self) -> ValueObject {
        let count = self.values().filter(|v| !v.is_null()).count();
        ValueObject::Number(count as f64)
    }

    /// Largest number, Null when there are none
    pub fn max(&self) -> ValueObject {
        self.fold_numbers(f64::max)
    }

    /// Smallest number, Null when there are none
    pub fn min(&self) -> ValueObject {
        self.fold_numbers(f64::min)
    }

    fn fold_numbers(&self, pick: fn(f64, f64) -> f64) -> ValueObject {
        let mut result: Option<f64> = None;
        for value in self.values() {
            match value {
                ValueObject::Number(n) => {
                    result = Some(result.map_or(*n, |acc| pick(acc, *n)));
                }
                ValueObject::Error(e) => return ValueObject::Error(*e),
                _ => {}
            }
        }
        result.map_or(ValueObject::Null, ValueObject::Number)
    }

    /// Sub-block by row and column ranges (`None` keeps the whole axis)
    ///
    /// Ranges are clipped to the array; an empty result is `None`.
    pub fn slice(&self, rows: Option<Range<usize>>, columns: Option<Range<usize>>) -> Option<ArrayValue> {
        let rows = clip(rows, self.row_count);
        let columns = clip(columns, self.column_count);
        if rows.is_empty() || columns.is_empty() {
            return None;
        }

        let data = self.rows[rows.clone()]
            .iter()
            .map(|row| row[columns.clone()].to_vec())
            .collect();
        let mut result = ArrayValue::new(data);
        result.origin = self.origin.as_ref().map(|o| ArrayOrigin {
            unit_id: o.unit_id.clone(),
            sheet_id: o.sheet_id.clone(),
            row: o.row + rows.start as u32,
            column: o.column + columns.start as u16,
        });
        Some(result)
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> ArrayValue {
        let rows = (0..self.column_count)
            .map(|c| (0..self.row_count).map(|r| self.rows[r][c].clone()).collect())
            .collect();
        ArrayValue::new(rows)
    }

    /// First `TRUE` element in row-major order
    pub fn first_true_position(&self) -> Option<(usize, usize)> {
        self.iter()
            .find(|(_, _, v)| matches!(v, ValueObject::Boolean(true)))
            .map(|(r, c, _)| (r, c))
    }

    /// Last `TRUE` element in row-major order
    pub fn last_true_position(&self) -> Option<(usize, usize)> {
        let positions: Vec<(usize, usize)> = self
            .iter()
            .filter(|(_, _, v)| matches!(v, ValueObject::Boolean(true)))
            .map(|(r, c, _)| (r, c))
            .collect();
        positions.last().copied()
    }

    /// Parse an array literal such as `{1,2;"a",TRUE}`
    ///
    /// `,` separates columns and `;` rows. Unquoted words that are not
    /// numbers, booleans or error codes are taken as text.
    pub fn parse_literal(literal: &str) -> FormulaResult<ArrayValue> {
        let trimmed = literal.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| FormulaError::InvalidLiteral(literal.to_string()))?;
        if inner.trim().is_empty() {
            return Ok(ArrayValue::empty());
        }

        let mut rows: Vec<Vec<ValueObject>> = vec![Vec::new()];
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = inner.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    current.push_str("\"\"");
                    chars.next();
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(c);
                }
                ',' | ';' if !in_quotes => {
                    let element = parse_array_element(&current);
                    if let Some(row) = rows.last_mut() {
                        row.push(element);
                    }
                    current.clear();
                    if c == ';' {
                        rows.push(Vec::new());
                    }
                }
                _ => current.push(c),
            }
        }
        if in_quotes {
            return Err(FormulaError::InvalidLiteral(literal.to_string()));
        }
        if let Some(row) = rows.last_mut() {
            row.push(parse_array_element(&current));
        }

        Ok(ArrayValue::new(rows))
    }
}

fn clip(range: Option<Range<usize>>, len: usize) -> Range<usize> {
    match range {
        Some(r) => r.start.min(len)..r.end.min(len),
        None => 0..len,
    }
}

fn normalize_element(value: ValueObject) -> ValueObject {
    match value {
        ValueObject::Array(a) => a
            .single()
            .cloned()
            .unwrap_or(ValueObject::Error(CellError::Value)),
        ValueObject::Reference(r) => normalize_element(r.to_array_value()),
        ValueObject::AsyncScalar(_) | ValueObject::AsyncArray(_) => {
            ValueObject::Error(CellError::GettingData)
        }
        scalar => scalar,
    }
}

fn parse_array_element(token: &str) -> ValueObject {
    let token = token.trim();
    if token.is_empty() {
        return ValueObject::Null;
    }
    parse_scalar_token(token).unwrap_or_else(|| ValueObject::string(token))
}

/// Parse a scalar literal token: number, `TRUE`/`FALSE`, error code or
/// double-quoted string
pub(crate) fn parse_scalar_token(token: &str) -> Option<ValueObject> {
    let token = token.trim();
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        let body = &token[1..token.len() - 1];
        return Some(ValueObject::string(body.replace("\"\"", "\"")));
    }
    if token.eq_ignore_ascii_case("TRUE") {
        return Some(ValueObject::Boolean(true));
    }
    if token.eq_ignore_ascii_case("FALSE") {
        return Some(ValueObject::Boolean(false));
    }
    if let Some(e) = CellError::from_str(token) {
        return Some(ValueObject::Error(e));
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(ValueObject::Number)
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                write!(f, ";")?;
            }
            for (c, value) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ",")?;
                }
                match value {
                    ValueObject::String(s) => write!(f, "\"{}\"", s.as_str().replace('"', "\"\""))?,
                    other => write!(f, "{}", other)?,
                }
            }
        }
        write!(f, "}}")
    }
}
