use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use crate::domain::CsvRow;

#[derive(Error, Debug)]
pub enum CsvReadError {
    #[error("Path to CSV is invalid!")]
    PathDoesNotExist,

    #[error("Failed to read CSV: {0}")]
    IoReadError(String),

    #[error("Malformed CSV row: {0}")]
    MalformedRow(String),
}

/// The parsed input file: its header line plus the raw transaction rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub header: Vec<String>,
    pub rows: Vec<CsvRow>,
}

pub fn open_csv(path: &str) -> Result<File, CsvReadError> {
    if !Path::new(path).exists() {
        return Err(CsvReadError::PathDoesNotExist);
    }

    File::open(path).map_err(|err| CsvReadError::IoReadError(err.to_string()))
}

/// Reads the whole statement. The first line is treated as a header and
/// echoed into the output later; every other line becomes a raw row. Ragged
/// lines are a hard error since the output could not mirror the input shape.
pub fn read_csv(path: &str) -> Result<Statement, CsvReadError> {
    let file = open_csv(path)?;
    let reader = BufReader::new(file);

    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader);

    let header = csv_reader
        .headers()
        .map_err(|err| CsvReadError::IoReadError(err.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|err| CsvReadError::IoReadError(err.to_string()))?;
        let row = CsvRow::from_record(&record)
            .map_err(|err| CsvReadError::MalformedRow(err.to_string()))?;
        rows.push(row);
    }

    Ok(Statement { header, rows })
}
