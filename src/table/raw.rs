//! Raw string-celled tables as exported by the building-management system.

use std::io::Read;

use chrono::NaiveDateTime;

use crate::error::AuditError;
use crate::table::TimeTable;

/// Day-first timestamp formats seen in BMS exports.
const DAYFIRST_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M", "%d/%m/%Y"];

/// A raw export table: string cells under string headers.
///
/// This is the shape a CSV export has before any cleaning. Conversion to a
/// [`TimeTable`] parses timestamps day-first and coerces every other cell to
/// a number.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a raw table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Reads a raw table from CSV.
    ///
    /// # Errors
    ///
    /// Returns a `Csv` error if the input is not well-formed CSV.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, AuditError> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Column headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts to a numeric time-indexed table.
    ///
    /// The named timestamp column is parsed day-first (whitespace between
    /// date and time is collapsed first; some exports double it). Every
    /// other cell is stripped of `,` thousands separators and parsed as
    /// `f64`; empty cells become missing readings.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the timestamp column is absent,
    /// `InvalidTimestamp` on an unparseable timestamp, or `NonNumericValue`
    /// on an unparseable cell.
    pub fn into_time_table(self, timestamp_column: &str) -> Result<TimeTable, AuditError> {
        let ts_idx = self
            .headers
            .iter()
            .position(|h| h == timestamp_column)
            .ok_or_else(|| AuditError::MissingColumn {
                column: timestamp_column.to_string(),
            })?;

        let mut timestamps = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            timestamps.push(parse_dayfirst(row.get(ts_idx).map_or("", String::as_str))?);
        }

        let mut table = TimeTable::new(timestamps);
        for (c, header) in self.headers.iter().enumerate() {
            if c == ts_idx {
                continue;
            }
            let mut values = Vec::with_capacity(self.rows.len());
            for row in &self.rows {
                values.push(parse_cell(row.get(c).map_or("", String::as_str), header)?);
            }
            table.push_column(header.clone(), values)?;
        }
        Ok(table)
    }
}

/// Parses a day-first BMS timestamp.
///
/// # Errors
///
/// Returns `InvalidTimestamp` if no known format matches.
pub fn parse_dayfirst(value: &str) -> Result<NaiveDateTime, AuditError> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    for fmt in DAYFIRST_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(ts);
        }
        // Date-only rows carry no time component.
        if let Ok(d) = chrono::NaiveDate::parse_from_str(&normalized, fmt) {
            if let Some(ts) = d.and_hms_opt(0, 0, 0) {
                return Ok(ts);
            }
        }
    }
    Err(AuditError::InvalidTimestamp {
        value: value.to_string(),
    })
}

fn parse_cell(value: &str, column: &str) -> Result<Option<f64>, AuditError> {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| AuditError::NonNumericValue {
            column: column.to_string(),
            value: value.to_string(),
        })
}
