//! CSV export for time-indexed tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::table::TimeTable;

/// Timestamp format used in exported CSV.
const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Exports a table to a CSV file at the given path.
///
/// Writes a `Timestamp` header plus one column per table column, then one
/// data row per interval. Produces deterministic output for identical
/// inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(table: &TimeTable, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(table, buf)
}

/// Writes a table as CSV to any writer.
///
/// Values are written with 3 decimal places; missing readings become empty
/// cells.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(table: &TimeTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let names = table.column_names();
    let mut header = Vec::with_capacity(names.len() + 1);
    header.push("Timestamp");
    header.extend(names.iter().copied());
    wtr.write_record(&header)?;

    let columns: Vec<&[Option<f64>]> = names
        .iter()
        .filter_map(|n| table.column(n).ok())
        .collect();
    for (i, ts) in table.timestamps().iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(ts.format(TIMESTAMP_FMT).to_string());
        for col in &columns {
            record.push(col[i].map_or_else(String::new, |v| format!("{v:.3}")));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
