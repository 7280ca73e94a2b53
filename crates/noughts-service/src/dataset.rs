//! The canonical labeled board dataset, stored as CSV.
//!
//! The header row holds the label column followed by the 9 board columns. The label column is
//! written as `outcome`; on read any name is accepted there.
//!
//! ```text
//! outcome,top-left-square,top-middle-square,...,bottom-right-square
//! x,x,x,x,o,o,b,b,b,b
//! ```

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use noughts_engine::{BOARD_CELLS, Board, Symbol};

use crate::{generators, table::Table};

pub const LABEL_COLUMN: &str = "outcome";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DatasetError {
    #[display("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to read or write dataset: {source}")]
    Csv { source: csv::Error },
    #[display("unexpected dataset header: {found}")]
    InvalidHeader { found: String },
    #[display("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

impl From<csv::Error> for DatasetError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { source }
    }
}

fn header() -> Vec<String> {
    let mut header = vec![LABEL_COLUMN.to_owned()];
    header.extend(generators::board_state_column_names());
    header
}

/// Reads a labeled board table.
pub fn read_dataset<R>(reader: R) -> Result<Table, DatasetError>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let found = reader.headers()?.iter().map(str::to_owned).collect::<Vec<_>>();
    let board_columns = generators::board_state_column_names();
    if found.len() != BOARD_CELLS + 1 || found[1..] != board_columns[..] {
        return Err(DatasetError::InvalidHeader {
            found: found.join(","),
        });
    }

    let mut boards = vec![];
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let invalid = |reason: String| DatasetError::InvalidRecord { line, reason };

        let label = record.get(0).unwrap_or_default();
        if label.is_empty() {
            return Err(invalid("empty label".to_owned()));
        }
        let mut cells = [Symbol::Blank; BOARD_CELLS];
        for (i, cell) in cells.iter_mut().enumerate() {
            let field = record.get(i + 1).unwrap_or_default();
            let mut chars = field.chars();
            *cell = match (chars.next(), chars.next()) {
                (Some(ch), None) => Symbol::from_char(ch),
                _ => None,
            }
            .ok_or_else(|| invalid(format!("invalid symbol {field:?} in column {}", i + 1)))?;
        }
        boards.push((Some(label.to_owned()), Board::new(cells)));
    }
    Ok(Table::from_boards(boards))
}

/// Loads the dataset file at `path`.
pub fn load_dataset(path: &Path) -> Result<Table, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })?;
    let table = read_dataset(io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), rows = table.len(), "loaded dataset");
    Ok(table)
}

/// Writes every board with its outcome label, in enumeration order.
///
/// Returns the number of rows written.
pub fn write_dataset<W>(writer: W) -> Result<usize, DatasetError>
where
    W: io::Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(header())?;
    let mut rows = 0;
    for board in Board::all() {
        let mut record = Vec::with_capacity(BOARD_CELLS + 1);
        record.push(board.outcome().to_string());
        record.extend(board.cells().iter().map(ToString::to_string));
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush().map_err(|e| DatasetError::Csv { source: e.into() })?;
    Ok(rows)
}

/// Generates the full dataset into a file at `path`.
pub fn generate_dataset(path: &Path) -> Result<usize, DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })?;
    let rows = write_dataset(io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows, "generated dataset");
    Ok(rows)
}
