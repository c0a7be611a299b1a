//! Coordinate and answer-key datasets.
//!
//! Both datasets are tables with named columns:
//! - coordinates: `Question`, `Answer`, `X`, `Y`
//! - answer key: `Question`, `Answer`
//!
//! They can be read from CSV (header row required) or JSON (an array of
//! objects keyed by column name). CSV headers and cells are trimmed of
//! surrounding whitespace. CSV cells carry no type, so a question cell that
//! parses as an integer becomes [`QuestionId::Int`]; JSON keeps its own
//! types (`1` and `"1"` are different questions) and its strings verbatim.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;
use serde_json::Value;

#[cfg(feature = "tracing")]
use tracing::instrument;

use scantron_core::{
    AnswerKey, AnswerKeyEntry, CoordinateEntry, CoordinateIndex, DataError, QuestionId,
};

pub const QUESTION_COLUMN: &str = "Question";
pub const ANSWER_COLUMN: &str = "Answer";
pub const X_COLUMN: &str = "X";
pub const Y_COLUMN: &str = "Y";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    /// Pick the format from the file extension (`.csv` / `.json`).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(DatasetFormat::Csv),
            "json" => Some(DatasetFormat::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Cell {
    Empty,
    /// Untyped CSV text.
    Raw(String),
    Int(i64),
    Float(f64),
    Text(String),
    /// JSON value with no tabular meaning (bool, array, object).
    Other(String),
}

impl Cell {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::String(s) => Cell::Text(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Other(n.to_string())),
            },
            other => Cell::Other(other.to_string()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Cell::Empty => "empty".to_string(),
            Cell::Raw(s) | Cell::Text(s) => format!("{s:?}"),
            Cell::Int(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Other(s) => s.clone(),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// In-memory table with the dataset name kept for error messages.
struct Table {
    dataset: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    fn from_csv(dataset: &str, reader: impl Read) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| DataError::parse(dataset, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| DataError::parse(dataset, e))?;
            let row = record
                .iter()
                .map(|field| match field {
                    "" => Cell::Empty,
                    _ => Cell::Raw(field.to_string()),
                })
                .collect();
            rows.push(row);
        }

        Ok(Self {
            dataset: dataset.to_string(),
            columns,
            rows,
        })
    }

    fn from_json(dataset: &str, reader: impl Read) -> Result<Self, DataError> {
        let records: Vec<serde_json::Map<String, Value>> =
            serde_json::from_reader(reader).map_err(|e| DataError::parse(dataset, e))?;

        // Union of keys in first-seen order; a record missing a key has an empty cell.
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).map(Cell::from_json).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Ok(Self {
            dataset: dataset.to_string(),
            columns,
            rows,
        })
    }

    fn read(dataset: &str, format: DatasetFormat, reader: impl Read) -> Result<Self, DataError> {
        match format {
            DatasetFormat::Csv => Self::from_csv(dataset, reader),
            DatasetFormat::Json => Self::from_json(dataset, reader),
        }
    }

    fn column(&self, name: &str) -> Result<usize, DataError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::MissingColumn {
                dataset: self.dataset.clone(),
                column: name.to_string(),
            })
    }

    fn ensure_rows(&self) -> Result<(), DataError> {
        if self.rows.is_empty() {
            return Err(DataError::Empty {
                dataset: self.dataset.clone(),
            });
        }
        Ok(())
    }

    fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows[row].get(col).unwrap_or(&EMPTY_CELL)
    }

    fn question(&self, row: usize, col: usize) -> Result<QuestionId, DataError> {
        match self.cell(row, col) {
            Cell::Raw(s) => Ok(QuestionId::from_cell(s)),
            Cell::Text(s) if !s.is_empty() => Ok(QuestionId::Text(s.clone())),
            Cell::Int(n) => Ok(QuestionId::Int(*n)),
            Cell::Empty | Cell::Text(_) => Err(self.missing(row, col)),
            other @ (Cell::Float(_) | Cell::Other(_)) => Err(self.unsupported(row, col, other)),
        }
    }

    fn label(&self, row: usize, col: usize) -> Result<String, DataError> {
        match self.cell(row, col) {
            Cell::Raw(s) => Ok(s.clone()),
            Cell::Text(s) if !s.is_empty() => Ok(s.clone()),
            Cell::Int(n) => Ok(n.to_string()),
            Cell::Float(f) => Ok(f.to_string()),
            Cell::Empty | Cell::Text(_) => Err(self.missing(row, col)),
            other @ Cell::Other(_) => Err(self.unsupported(row, col, other)),
        }
    }

    fn coordinate(&self, row: usize, col: usize) -> Result<f64, DataError> {
        let cell = self.cell(row, col);
        let value = match cell {
            Cell::Empty => return Err(self.missing(row, col)),
            Cell::Int(n) => Some(*n as f64),
            Cell::Float(f) => Some(*f),
            Cell::Raw(s) | Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Other(_) => None,
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(DataError::InvalidNumber {
                dataset: self.dataset.clone(),
                row: row + 1,
                column: self.columns[col].clone(),
                value: cell.describe(),
            }),
        }
    }

    fn missing(&self, row: usize, col: usize) -> DataError {
        DataError::MissingField {
            dataset: self.dataset.clone(),
            row: row + 1,
            column: self.columns[col].clone(),
        }
    }

    fn unsupported(&self, row: usize, col: usize, cell: &Cell) -> DataError {
        DataError::UnsupportedValue {
            dataset: self.dataset.clone(),
            row: row + 1,
            column: self.columns[col].clone(),
            value: cell.describe(),
        }
    }
}

/// Parse coordinate entries from a reader.
///
/// `dataset` names the source in error messages.
pub fn read_coordinates(
    dataset: &str,
    format: DatasetFormat,
    reader: impl Read,
) -> Result<Vec<CoordinateEntry>, DataError> {
    let table = Table::read(dataset, format, reader)?;
    let q = table.column(QUESTION_COLUMN)?;
    let a = table.column(ANSWER_COLUMN)?;
    let x = table.column(X_COLUMN)?;
    let y = table.column(Y_COLUMN)?;
    table.ensure_rows()?;

    (0..table.rows.len())
        .map(|row| -> Result<CoordinateEntry, DataError> {
            Ok(CoordinateEntry {
                question_id: table.question(row, q)?,
                answer_label: table.label(row, a)?,
                x: table.coordinate(row, x)?,
                y: table.coordinate(row, y)?,
            })
        })
        .collect()
}

/// Parse an answer key from a reader.
///
/// Rows are collapsed with [`AnswerKey::from_rows`]: a repeated question keeps
/// its first position and its last answer.
pub fn read_answer_key(
    dataset: &str,
    format: DatasetFormat,
    reader: impl Read,
) -> Result<AnswerKey, DataError> {
    let table = Table::read(dataset, format, reader)?;
    let q = table.column(QUESTION_COLUMN)?;
    let a = table.column(ANSWER_COLUMN)?;
    table.ensure_rows()?;

    let rows = (0..table.rows.len())
        .map(|row| -> Result<AnswerKeyEntry, DataError> {
            Ok(AnswerKeyEntry {
                question_id: table.question(row, q)?,
                answer_label: table.label(row, a)?,
            })
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    Ok(AnswerKey::from_rows(rows))
}

fn open(path: &Path) -> Result<(String, DatasetFormat, BufReader<File>), DataError> {
    let dataset = path.display().to_string();
    let format = DatasetFormat::from_path(path).ok_or_else(|| DataError::UnsupportedFormat {
        dataset: dataset.clone(),
    })?;
    let file = File::open(path).map_err(|source| DataError::Io {
        dataset: dataset.clone(),
        source,
    })?;
    Ok((dataset, format, BufReader::new(file)))
}

/// Load coordinate entries from a `.csv` or `.json` file.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn load_coordinates(path: impl AsRef<Path>) -> Result<Vec<CoordinateEntry>, DataError> {
    let (dataset, format, reader) = open(path.as_ref())?;
    let entries = read_coordinates(&dataset, format, reader)?;
    info!("{dataset}: {} coordinate rows", entries.len());
    Ok(entries)
}

/// Load a coordinate file and build the index from it.
pub fn load_coordinate_index(path: impl AsRef<Path>) -> Result<CoordinateIndex, DataError> {
    let entries = load_coordinates(path)?;
    CoordinateIndex::build(&entries)
}

/// Load an answer key from a `.csv` or `.json` file.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn load_answer_key(path: impl AsRef<Path>) -> Result<AnswerKey, DataError> {
    let (dataset, format, reader) = open(path.as_ref())?;
    let key = read_answer_key(&dataset, format, reader)?;
    info!("{dataset}: {} answer-key entries", key.len());
    Ok(key)
}
