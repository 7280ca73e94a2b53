//! Feature engineering over board tables.
//!
//! Every transform takes a [`Table`] by value and returns the transformed table. The board
//! transforms ([`onehot_encode`], [`calculate_move_counts`], [`calculate_adjacent_symbols`],
//! [`drop_board_columns`]) locate the 9 canonical board columns by name and fail with
//! [`TransformError::MissingColumn`] if any is absent. Resampling transforms group rows by
//! label and draw from the caller's generator, so a seeded generator gives a reproducible
//! result.

use std::collections::BTreeMap;

use noughts_engine::{BOARD_CELLS, Board, Square, Symbol};
use rand::{Rng, seq::index};

use crate::{
    generators,
    table::{Cell, Row, Table},
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TransformError {
    #[display("column {name:?} not found")]
    MissingColumn { name: String },
    #[display("expected a board symbol in column {column:?} of row {row}")]
    NotSymbol { row: usize, column: String },
    #[display("expected a number in column {column:?} of row {row}")]
    NotNumeric { row: usize, column: String },
    #[display("row {row} has no label")]
    UnlabeledRow { row: usize },
    #[display("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("failed to build feature matrix: {source}")]
    Shape { source: ndarray::ShapeError },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum BalanceError {
    #[display("tolerance must be a finite non-negative number, got {tolerance}")]
    #[from(ignore)]
    InvalidTolerance { tolerance: f64 },
    #[display("dataset still unbalanced after {max_iterations} removals")]
    #[from(ignore)]
    NotConverged { max_iterations: usize },
    #[display("{_0}")]
    Transform(TransformError),
}

/// Default relative tolerance for [`balance_dataset`].
pub const BALANCE_TOLERANCE: f64 = 0.05;

const HORIZONTAL_PAIRS: [(usize, usize); 6] = [(0, 1), (1, 2), (3, 4), (4, 5), (6, 7), (7, 8)];
const VERTICAL_PAIRS: [(usize, usize); 6] = [(0, 3), (3, 6), (1, 4), (4, 7), (2, 5), (5, 8)];
/// Bottom-left to top-right.
const DIAGONAL_POS_PAIRS: [(usize, usize); 2] = [(6, 4), (4, 2)];
/// Top-left to bottom-right.
const DIAGONAL_NEG_PAIRS: [(usize, usize); 2] = [(0, 4), (4, 8)];

/// Column names appended by [`calculate_adjacent_symbols`], `x` first.
#[must_use]
pub fn adjacency_column_names() -> Vec<String> {
    Symbol::PLAYERS
        .into_iter()
        .flat_map(|p| {
            ["horizontal", "vertical", "diagonal_pos", "diagonal_neg"]
                .into_iter()
                .map(move |axis| format!("{p}_adj_{axis}"))
        })
        .collect()
}

/// Counts the pairs of `symbol` in adjacent squares along each axis, in
/// `[horizontal, vertical, diagonal_pos, diagonal_neg]` order.
#[must_use]
pub fn adjacent_pairs(board: &Board, symbol: Symbol) -> [usize; 4] {
    let cells = board.cells();
    let count = |pairs: &[(usize, usize)]| {
        pairs
            .iter()
            .filter(|(a, b)| cells[*a] == symbol && cells[*b] == symbol)
            .count()
    };
    [
        count(&HORIZONTAL_PAIRS),
        count(&VERTICAL_PAIRS),
        count(&DIAGONAL_POS_PAIRS),
        count(&DIAGONAL_NEG_PAIRS),
    ]
}

fn board_indices(table: &Table) -> Result<[usize; BOARD_CELLS], TransformError> {
    let indices = table.column_indices(&generators::board_state_column_names())?;
    let mut out = [0; BOARD_CELLS];
    out.copy_from_slice(&indices);
    Ok(out)
}

fn read_board(
    table: &Table,
    indices: &[usize; BOARD_CELLS],
    row: usize,
) -> Result<Board, TransformError> {
    let cells = &table.rows()[row].cells;
    let mut board = Board::empty();
    for (square, &column) in Square::ALL.into_iter().zip(indices) {
        let symbol = cells[column]
            .as_symbol()
            .ok_or_else(|| TransformError::NotSymbol {
                row,
                column: table.columns()[column].clone(),
            })?;
        board.set(square, symbol);
    }
    Ok(board)
}

/// Appends numeric columns computed from each row's board.
fn append_board_columns<F, const N: usize>(
    table: Table,
    names: Vec<String>,
    f: F,
) -> Result<Table, TransformError>
where
    F: Fn(&Board) -> [usize; N],
{
    debug_assert_eq!(names.len(), N);
    let indices = board_indices(&table)?;
    let boards = (0..table.len())
        .map(|row| read_board(&table, &indices, row))
        .collect::<Result<Vec<_>, _>>()?;

    let (mut columns, mut rows) = table.into_parts();
    columns.extend(names);
    for (row, board) in rows.iter_mut().zip(&boards) {
        row.cells
            .extend(f(board).into_iter().map(|v| Cell::Number(count_value(v))));
    }
    Ok(Table::from_parts(columns, rows))
}

#[expect(clippy::cast_precision_loss)]
fn count_value(count: usize) -> f64 {
    count as f64
}

/// Replaces the 9 board columns with the 27 one-hot indicator columns.
///
/// The indicator columns come first, in [`generators::onehot_column_names`] order, followed
/// by every non-board column in its original order. All 27 columns exist whatever symbols
/// the data contains.
pub fn onehot_encode(table: Table) -> Result<Table, TransformError> {
    let indices = board_indices(&table)?;
    let boards = (0..table.len())
        .map(|row| read_board(&table, &indices, row))
        .collect::<Result<Vec<_>, _>>()?;

    let (columns, rows) = table.into_parts();
    let kept = (0..columns.len())
        .filter(|i| !indices.contains(i))
        .collect::<Vec<_>>();

    let mut new_columns = generators::onehot_column_names();
    new_columns.extend(kept.iter().map(|&i| columns[i].clone()));

    let new_rows = rows
        .into_iter()
        .zip(&boards)
        .map(|(row, board)| {
            let mut cells = Vec::with_capacity(new_columns.len());
            for symbol in Symbol::ALL {
                cells.extend(board.cells().iter().map(|s| {
                    Cell::Number(if *s == symbol { 1.0 } else { 0.0 })
                }));
            }
            cells.extend(kept.iter().map(|&i| row.cells[i]));
            Row {
                label: row.label,
                cells,
            }
        })
        .collect();
    Ok(Table::from_parts(new_columns, new_rows))
}

/// Maps every symbol cell to its ordinal value (`x` → 1, `b` → 0, `o` → -1).
#[must_use]
pub fn ordinal_encode(table: Table) -> Table {
    let (columns, mut rows) = table.into_parts();
    for cell in rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
        if let Cell::Symbol(s) = *cell {
            *cell = Cell::Number(f64::from(s.ordinal()));
        }
    }
    Table::from_parts(columns, rows)
}

/// Appends `x_count` and `o_count`, the number of each player's symbols on the board.
pub fn calculate_move_counts(table: Table) -> Result<Table, TransformError> {
    append_board_columns(
        table,
        vec!["x_count".to_owned(), "o_count".to_owned()],
        |board| Symbol::PLAYERS.map(|p| board.count(p)),
    )
}

/// Appends the 8 adjacency columns (see [`adjacency_column_names`]).
pub fn calculate_adjacent_symbols(table: Table) -> Result<Table, TransformError> {
    append_board_columns(table, adjacency_column_names(), |board| {
        let [xh, xv, xp, xn] = adjacent_pairs(board, Symbol::Cross);
        let [oh, ov, op, on] = adjacent_pairs(board, Symbol::Nought);
        [xh, xv, xp, xn, oh, ov, op, on]
    })
}

/// Removes the 9 board columns, keeping every other column.
pub fn drop_board_columns(table: Table) -> Result<Table, TransformError> {
    let indices = board_indices(&table)?;
    let (columns, rows) = table.into_parts();
    let keep = |i: &usize| !indices.contains(i);
    let new_columns = (0..columns.len())
        .filter(keep)
        .map(|i| columns[i].clone())
        .collect();
    let new_rows = rows
        .into_iter()
        .map(|row| Row {
            cells: (0..row.cells.len())
                .filter(keep)
                .map(|i| row.cells[i])
                .collect(),
            label: row.label,
        })
        .collect();
    Ok(Table::from_parts(new_columns, new_rows))
}

/// Row indices per label, labels in sorted order.
fn rows_by_label(table: &Table) -> Result<BTreeMap<&str, Vec<usize>>, TransformError> {
    let mut groups = BTreeMap::<&str, Vec<usize>>::new();
    for (i, row) in table.rows().iter().enumerate() {
        let label = row
            .label
            .as_deref()
            .ok_or(TransformError::UnlabeledRow { row: i })?;
        groups.entry(label).or_default().push(i);
    }
    Ok(groups)
}

fn select_rows(table: Table, selection: &[usize]) -> Table {
    let (columns, rows) = table.into_parts();
    let rows = selection.iter().map(|&i| rows[i].clone()).collect();
    Table::from_parts(columns, rows)
}

/// Randomly drops rows (without replacement) until every label has as many rows as the
/// rarest one. Surviving rows keep their relative order.
pub fn downsample_dataset<R>(table: Table, rng: &mut R) -> Result<Table, TransformError>
where
    R: Rng + ?Sized,
{
    let groups = rows_by_label(&table)?;
    let Some(target) = groups.values().map(Vec::len).min() else {
        return Ok(table);
    };
    let mut selection = vec![];
    for rows in groups.values() {
        selection.extend(index::sample(rng, rows.len(), target).into_iter().map(|i| rows[i]));
    }
    selection.sort_unstable();
    tracing::debug!(rows_per_label = target, total = selection.len(), "downsampled dataset");
    Ok(select_rows(table, &selection))
}

/// Appends randomly chosen duplicates (with replacement) until every label has as many rows
/// as the most common one. Original rows stay first, in order.
pub fn upsample_dataset<R>(table: Table, rng: &mut R) -> Result<Table, TransformError>
where
    R: Rng + ?Sized,
{
    let groups = rows_by_label(&table)?;
    let Some(target) = groups.values().map(Vec::len).max() else {
        return Ok(table);
    };
    let mut selection = (0..table.len()).collect::<Vec<_>>();
    for rows in groups.values() {
        for _ in rows.len()..target {
            selection.push(rows[rng.random_range(0..rows.len())]);
        }
    }
    tracing::debug!(rows_per_label = target, total = selection.len(), "upsampled dataset");
    Ok(select_rows(table, &selection))
}

/// Randomly removes rows of over-represented labels until every label count is within
/// `tolerance` of the rarest label's count (`count <= min * (1 + tolerance)`).
///
/// Each iteration removes one row, chosen uniformly among the rows whose label is currently
/// over-represented, so the loop always makes progress. It stops with
/// [`BalanceError::NotConverged`] after `max_iterations` removals.
pub fn balance_dataset<R>(
    table: Table,
    tolerance: f64,
    rng: &mut R,
    max_iterations: usize,
) -> Result<Table, BalanceError>
where
    R: Rng + ?Sized,
{
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(BalanceError::InvalidTolerance { tolerance });
    }
    let labels = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, r)| r.label.clone().ok_or(TransformError::UnlabeledRow { row }))
        .collect::<Result<Vec<_>, _>>()?;
    let mut counts = BTreeMap::<String, usize>::new();
    for label in &labels {
        *counts.entry(label.clone()).or_default() += 1;
    }
    let mut alive = vec![true; table.len()];

    let mut removed = 0;
    loop {
        let Some(&min) = counts.values().min() else {
            break;
        };
        let limit = count_value(min) * (1.0 + tolerance);
        let candidates = (0..labels.len())
            .filter(|&i| alive[i] && count_value(counts[&labels[i]]) > limit)
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            break;
        }
        if removed == max_iterations {
            return Err(BalanceError::NotConverged { max_iterations });
        }
        let victim = candidates[rng.random_range(0..candidates.len())];
        alive[victim] = false;
        if let Some(count) = counts.get_mut(&labels[victim]) {
            *count -= 1;
        }
        removed += 1;
    }

    let selection = (0..alive.len()).filter(|&i| alive[i]).collect::<Vec<_>>();
    tracing::debug!(removed, remaining = selection.len(), "balanced dataset");
    Ok(select_rows(table, &selection))
}
