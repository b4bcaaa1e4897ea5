//! Building aggregator: one energy column per room, shared timestamp index.

use tracing::debug;

use crate::clean::rooms::RoomInfo;
use crate::config::BuildingConfig;
use crate::error::AuditError;
use crate::schema::{declared_schema, validate_schema};
use crate::table::TimeTable;

use super::transfer::{CalcMode, ConductionTerms, energy_series};

/// Aggregation options.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    /// Calculation mode applied to every room.
    pub mode: CalcMode,
    /// Sort room columns alphabetically.
    pub sort_rooms: bool,
    /// Drop rows with a missing value in any room column.
    pub drop_incomplete: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            mode: CalcMode::Conduction(ConductionTerms::full()),
            sort_rooms: true,
            drop_incomplete: false,
        }
    }
}

/// Computes the building-wide energy-flow table.
///
/// Validates the declared sensor schema up front (fail fast on a missing
/// zone column), restricts the temperature table to the operating window
/// once, then computes every room's series against the shared index.
///
/// Guarantees: exactly one column per room, keyed by room name; the row
/// count equals the time-filtered temperature table unless
/// `drop_incomplete` removes rows with missing values.
///
/// # Errors
///
/// Returns `UnknownControlUnit` or `MissingColumn` for unresolvable rooms,
/// `DuplicateColumn` if two metadata rows share a room name, or
/// `InvalidConfig` for unparseable window bounds.
pub fn energy_to_building(
    temps: &TimeTable,
    rooms: &[RoomInfo],
    config: &BuildingConfig,
    options: &AggregateOptions,
) -> Result<TimeTable, AuditError> {
    let windowed = temps.between_time(config.window_start()?, config.window_end()?);

    let schema = declared_schema(rooms, config)?;
    validate_schema(&schema, &windowed)?;

    let mut building = TimeTable::new(windowed.timestamps().to_vec());
    for room in rooms {
        let series = energy_series(&windowed, room, config, options.mode)?;
        building.push_column(room.name.clone(), series.kilojoules)?;
    }
    debug!(
        rooms = rooms.len(),
        rows = building.len(),
        "aggregated building energy table"
    );

    if options.sort_rooms {
        building.sort_columns_by_name();
    }
    if options.drop_incomplete {
        return Ok(building.drop_incomplete_rows());
    }
    Ok(building)
}
