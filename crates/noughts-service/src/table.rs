//! In-memory tabular data flowing through the feature pipelines.
//!
//! A [`Table`] is a list of column names plus rows of [`Cell`]s. Each row may carry a
//! label (the game outcome for dataset rows, nothing for a board submitted for
//! prediction). Transforms in [`crate::data`] consume a table and return a new one.

use std::fmt;

use ndarray::Array2;
use noughts_engine::{Board, Symbol};

use crate::{data::TransformError, generators};

/// Value of a single table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Symbol(Symbol),
    Number(f64),
}

impl Cell {
    #[must_use]
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Symbol(_) => None,
        }
    }

    #[must_use]
    pub fn as_symbol(self) -> Option<Symbol> {
        match self {
            Self::Symbol(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: Option<String>,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Numeric feature matrix extracted from a fully encoded table.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub columns: Vec<String>,
    pub x: Array2<f64>,
    pub labels: Vec<Option<String>>,
}

impl Features {
    /// Labels of every row, failing on the first unlabeled one.
    pub fn require_labels(&self) -> Result<Vec<&str>, TransformError> {
        self.labels
            .iter()
            .enumerate()
            .map(|(row, label)| label.as_deref().ok_or(TransformError::UnlabeledRow { row }))
            .collect()
    }
}

impl Table {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    /// Builds a table with the 9 canonical board columns, one row per board.
    pub fn from_boards<I>(boards: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Board)>,
    {
        let rows = boards
            .into_iter()
            .map(|(label, board)| Row {
                label,
                cells: board.cells().iter().copied().map(Cell::Symbol).collect(),
            })
            .collect();
        Self {
            columns: generators::board_state_column_names(),
            rows,
        }
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.cells.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn push_row(
        &mut self,
        label: Option<String>,
        cells: Vec<Cell>,
    ) -> Result<(), TransformError> {
        if cells.len() != self.columns.len() {
            return Err(TransformError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        self.rows.push(Row { label, cells });
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_indices<S>(&self, names: &[S]) -> Result<Vec<usize>, TransformError>
    where
        S: AsRef<str>,
    {
        names
            .iter()
            .map(|name| {
                self.column_index(name.as_ref())
                    .ok_or_else(|| TransformError::MissingColumn {
                        name: name.as_ref().to_owned(),
                    })
            })
            .collect()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }

    /// Converts the table to a numeric matrix. Every cell must already be a number.
    pub fn to_features(&self) -> Result<Features, TransformError> {
        let mut values = Vec::with_capacity(self.rows.len() * self.columns.len());
        for (row, r) in self.rows.iter().enumerate() {
            for (column, cell) in r.cells.iter().enumerate() {
                let value = cell.as_number().ok_or_else(|| TransformError::NotNumeric {
                    row,
                    column: self.columns[column].clone(),
                })?;
                values.push(value);
            }
        }
        let x = Array2::from_shape_vec((self.rows.len(), self.columns.len()), values)
            .map_err(|source| TransformError::Shape { source })?;
        Ok(Features {
            columns: self.columns.clone(),
            x,
            labels: self.rows.iter().map(|r| r.label.clone()).collect(),
        })
    }
}
