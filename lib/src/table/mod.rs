//! Schema-evolving tabular storage.
//!
//! A [`Table`] is an ordered mapping from column name to a typed [`Column`].
//! Every cell is nullable (`None`). Columns can be added after loading, which
//! is how embedding vectors grow the schema (see [`Table::ensure_float_column`]).
//!
//! # Example
//!
//! ```rust
//! use parcel_features::table::{Column, Table};
//!
//! let table = Table::from_columns(vec![
//!     ("Land_ID".to_string(), Column::Numeric(vec![Some(1.0), Some(2.0)])),
//!     ("State".to_string(), Column::Text(vec![Some("goa".into()), None])),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.n_rows(), 2);
//! assert_eq!(table.row_position("Land_ID", 2), Some(1));
//! ```

mod csv_io;

use crate::error::{PipelineError, Result};

/// A single typed column with nullable cells.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Floating point values.
    Numeric(Vec<Option<f64>>),
    /// Free-form strings.
    Text(Vec<Option<String>>),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    /// True when the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for [`Column::Numeric`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Whether the cell at `row` is null. Out-of-range rows count as null.
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Numeric(v) => v.get(row).is_none_or(|c| c.is_none()),
            Column::Text(v) => v.get(row).is_none_or(|c| c.is_none()),
        }
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_null(row)).count()
    }

    /// Borrow as numeric values.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    /// Borrow as text values.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Render a cell as a string (`None` for null). Used for CSV output and
    /// for grouping rows by value.
    pub fn cell_to_string(&self, row: usize) -> Option<String> {
        match self {
            Column::Numeric(v) => v.get(row).copied().flatten().map(format_number),
            Column::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Convert to a numeric column. Text cells that do not parse become null.
    pub fn to_numeric(&self) -> Column {
        match self {
            Column::Numeric(_) => self.clone(),
            Column::Text(v) => Column::Numeric(
                v.iter()
                    .map(|cell| cell.as_deref().and_then(|s| s.trim().parse::<f64>().ok()))
                    .map(|x| x.filter(|f| f.is_finite()))
                    .collect(),
            ),
        }
    }

    /// Set a numeric cell. Ignored for text columns and out-of-range rows.
    pub fn set_numeric(&mut self, row: usize, value: Option<f64>) {
        if let Column::Numeric(v) = self {
            if let Some(cell) = v.get_mut(row) {
                *cell = value;
            }
        }
    }

    /// Select cells at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Format a float the way the CSV export writes it (integers without `.0`).
fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// An ordered, schema-evolving table of nullable columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut table = Table::new();
        for (name, column) in columns {
            if table.has_column(&name) {
                return Err(PipelineError::InvalidParameter(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
            table.insert_column(name, column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(name, column)` pairs in table order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether a column named `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Mutably borrow a column by name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.position(name).map(move |i| &mut self.columns[i])
    }

    /// Borrow a numeric column's values.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Borrow a text column's values.
    pub fn text(&self, name: &str) -> Option<&[Option<String>]> {
        self.column(name).and_then(Column::as_text)
    }

    /// Insert a column, replacing any existing column with the same name
    /// in place. The first column of an empty table fixes the row count.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(PipelineError::InvalidShape {
                expected: self.n_rows,
                got: column.len(),
            });
        }

        match self.position(&name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name);
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Remove a column, returning it if it existed.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let i = self.position(name)?;
        self.names.remove(i);
        Some(self.columns.remove(i))
    }

    /// Make sure `name` exists as a numeric column.
    ///
    /// A missing column is created with every cell null; a text column is
    /// converted with [`Column::to_numeric`].
    pub fn ensure_float_column(&mut self, name: &str) -> Result<()> {
        match self.column(name) {
            Some(Column::Numeric(_)) => Ok(()),
            Some(col @ Column::Text(_)) => {
                let converted = col.to_numeric();
                self.insert_column(name, converted)
            }
            None => self.insert_column(name, Column::Numeric(vec![None; self.n_rows])),
        }
    }

    /// Keep rows where `mask` is true. Returns a fresh table.
    pub fn retain_rows(&self, mask: &[bool]) -> Table {
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take_rows(&indices)
    }

    /// Select rows at `indices`, in that order. Returns a fresh table.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        }
    }

    /// Integer value of the key column at `row`, if it holds one.
    pub fn id_at(&self, key: &str, row: usize) -> Option<i64> {
        match self.column(key)? {
            Column::Numeric(v) => v
                .get(row)
                .copied()
                .flatten()
                .filter(|x| x.fract() == 0.0)
                .map(|x| x as i64),
            Column::Text(v) => v.get(row)?.as_deref()?.trim().parse().ok(),
        }
    }

    /// Position of the first row whose key column equals `id`.
    pub fn row_position(&self, key: &str, id: i64) -> Option<usize> {
        (0..self.n_rows).find(|&row| self.id_at(key, row) == Some(id))
    }
}
