//! Temperature Table Builder: raw per-device logs into one normalized table.

use tracing::debug;

use crate::config::BuildingConfig;
use crate::error::AuditError;
use crate::table::{RawTable, TimeTable};

/// Naming noise the BMS appends to temperature-log column titles.
const NAME_NOISE: &[&str] = &[" Extended Trend Log", " - Trend - Extd", "-00"];

/// Helper columns some exports carry that are not sensor readings.
const HELPER_COLUMNS: &[&str] = &["hour"];

/// Timestamp column name shared by all exports.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Builds the cleaned temperature table from the three raw logs.
///
/// The south FCU log samples every 5 minutes and is the join base; the
/// north FCU and AHU logs are inner-joined on exact timestamp equality, so
/// rows with no match across all three inputs are dropped. Column titles
/// are stripped of naming noise, duplicate outdoor-temperature/humidity
/// columns from the later logs are removed by the join, rows are restricted
/// to the configured inclusive date range, and the result is resampled to
/// the configured interval taking the first reading per bucket.
///
/// # Errors
///
/// Returns an error if a timestamp or cell fails to parse, if the
/// configured date range is invalid, or if it matches no rows.
pub fn build_temperature_table(
    fcu_sth: RawTable,
    fcu_nth: RawTable,
    ahu: RawTable,
    config: &BuildingConfig,
) -> Result<TimeTable, AuditError> {
    let sth = parse_log(fcu_sth)?;
    let nth = parse_log(fcu_nth)?;
    let ahu = parse_log(ahu)?;

    let mut merged = sth.inner_join(&nth).inner_join(&ahu);
    debug!(
        rows = merged.len(),
        columns = merged.column_names().len(),
        "merged temperature logs"
    );

    merged.drop_columns(HELPER_COLUMNS);

    let limited = merged.restrict_dates(config.date_start()?, config.date_end()?)?;
    Ok(limited.resample_first(config.sampling.freq_minutes))
}

/// Strips known naming noise from a column title.
pub fn normalize_column_name(name: &str) -> String {
    let mut cleaned = name.to_string();
    for noise in NAME_NOISE {
        cleaned = cleaned.replace(noise, "");
    }
    cleaned
}

fn parse_log(raw: RawTable) -> Result<TimeTable, AuditError> {
    let mut table = raw.into_time_table(TIMESTAMP_COLUMN)?;
    table.rename_columns(normalize_column_name);
    Ok(table)
}
