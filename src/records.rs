use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use itertools::Itertools;
use log::warn;
use thiserror::Error;

const ID_COLUMN: &str = "id";
const LAT_COLUMN: &str = "lat";
const LONG_COLUMN: &str = "long";

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

static EMPTY_CELL: Data = Data::Empty;

/// One location to fetch imagery for. `id` doubles as the output filename stem.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub lat: f64,
    pub long: f64,
}

impl Record {
    pub fn new(id: impl Into<String>, lat: f64, long: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            long,
        }
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("error reading csv input: {0}")]
    Csv(#[from] csv::Error),

    #[error("error reading spreadsheet input: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("spreadsheet has no worksheet")]
    NoWorksheet,

    #[error("input has no header row")]
    EmptyInput,

    #[error("input is missing required column(s): {0}")]
    MissingColumns(String),

    #[error("record {row}: invalid {column} value {value:?}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("error creating output folder {}: {source}", path.display())]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
}

impl InputFormat {
    /// Anything that is not a known spreadsheet extension is read as csv.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext) => InputFormat::Spreadsheet,
            Some("csv") => InputFormat::Csv,
            _ => {
                warn!(
                    "Unrecognized input extension for {}, reading it as csv",
                    path.display()
                );
                InputFormat::Csv
            }
        }
    }
}

/// Loads every record of the input table, keeping the table's row order.
pub fn load_records(path: &Path) -> Result<Vec<Record>, InputError> {
    match InputFormat::from_path(path) {
        InputFormat::Spreadsheet => read_spreadsheet(path),
        InputFormat::Csv => read_csv(path),
    }
}

struct Columns {
    id: usize,
    lat: usize,
    long: usize,
}

impl Columns {
    fn locate<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, InputError> {
        let headers = headers.into_iter().collect_vec();

        let find = |name: &str| headers.iter().position(|header| *header == name);

        match (find(ID_COLUMN), find(LAT_COLUMN), find(LONG_COLUMN)) {
            (Some(id), Some(lat), Some(long)) => Ok(Columns { id, lat, long }),

            (id, lat, long) => {
                let missing = [(ID_COLUMN, id), (LAT_COLUMN, lat), (LONG_COLUMN, long)]
                    .iter()
                    .filter(|(_, index)| index.is_none())
                    .map(|(name, _)| name)
                    .join(", ");

                Err(InputError::MissingColumns(missing))
            }
        }
    }
}

fn read_csv(path: &Path) -> Result<Vec<Record>, InputError> {
    let mut reader = csv::Reader::from_path(path)?;

    let columns = Columns::locate(reader.headers()?.iter())?;

    reader
        .records()
        .enumerate()
        .map(|(index, row)| {
            let row = row?;
            let field = |column: usize| row.get(column).unwrap_or_default();
            let number = index + 1;

            Ok(Record {
                id: parse_id(number, field(columns.id))?,
                lat: parse_coordinate(number, LAT_COLUMN, field(columns.lat))?,
                long: parse_coordinate(number, LONG_COLUMN, field(columns.long))?,
            })
        })
        .collect()
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Record>, InputError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(InputError::NoWorksheet)??;

    let mut rows = range.rows();

    let headers = rows
        .next()
        .ok_or(InputError::EmptyInput)?
        .iter()
        .map(cell_text)
        .collect_vec();

    let columns = Columns::locate(headers.iter().map(String::as_str))?;

    rows.enumerate()
        .map(|(index, row)| {
            let cell = |column: usize| row.get(column).unwrap_or(&EMPTY_CELL);
            let number = index + 1;

            Ok(Record {
                id: parse_id(number, &cell_text(cell(columns.id)))?,
                lat: cell_coordinate(number, LAT_COLUMN, cell(columns.lat))?,
                long: cell_coordinate(number, LONG_COLUMN, cell(columns.long))?,
            })
        })
        .collect()
}

// The id becomes a filename inside the output folder, so it must not name a path
fn parse_id(row: usize, raw: &str) -> Result<String, InputError> {
    let id = raw.trim();

    if id.is_empty() || id == ".." || id.contains(|c: char| c == '/' || c == '\\') {
        return Err(InputError::InvalidValue {
            row,
            column: ID_COLUMN,
            value: raw.to_string(),
        });
    }

    Ok(id.to_string())
}

fn parse_coordinate(row: usize, column: &'static str, raw: &str) -> Result<f64, InputError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::InvalidValue {
            row,
            column,
            value: raw.to_string(),
        })
}

// Whole floats print without a fraction, so an id cell holding 1.0 names the file 1.jpg
fn cell_text(cell: &Data) -> String {
    cell.to_string().trim().to_string()
}

fn cell_coordinate(row: usize, column: &'static str, cell: &Data) -> Result<f64, InputError> {
    match cell {
        Data::Float(value) if value.is_finite() => Ok(*value),
        Data::Int(value) => Ok(*value as f64),
        Data::String(raw) => parse_coordinate(row, column, raw),
        other => Err(InputError::InvalidValue {
            row,
            column,
            value: other.to_string(),
        }),
    }
}
