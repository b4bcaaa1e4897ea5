//! Declared sensor schema: unit → zone-temperature column resolution.

use crate::clean::rooms::RoomInfo;
use crate::config::BuildingConfig;
use crate::error::AuditError;
use crate::table::TimeTable;

/// Suffix of FCU zone-temperature columns.
const ZN_TMP_SUFFIX: &str = " ZnTmp";

/// Naming marker of fan coil units.
const FCU_MARKER: &str = "FCU";

/// Kind of climate-control unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Fan coil unit; zone column follows the `<unit> ZnTmp` pattern.
    Fcu,
    /// Air handling unit; zone column comes from the configured lookup.
    Ahu,
}

/// One declared sensor column: which unit it belongs to and how it is named
/// in the cleaned temperature table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorColumn {
    /// Control unit id.
    pub unit: String,
    /// Zone-temperature column name.
    pub column: String,
    /// Unit kind the column was resolved through.
    pub kind: UnitKind,
}

/// Resolves a control unit to its zone-temperature column.
///
/// Units carrying the FCU marker use the `<unit> ZnTmp` pattern; all other
/// units must appear in the configured lookup map.
///
/// # Errors
///
/// Returns `UnknownControlUnit` if the unit is neither an FCU unit nor in
/// the lookup map.
pub fn resolve_zone_column(unit: &str, config: &BuildingConfig) -> Result<SensorColumn, AuditError> {
    if unit.contains(FCU_MARKER) {
        return Ok(SensorColumn {
            unit: unit.to_string(),
            column: format!("{unit}{ZN_TMP_SUFFIX}"),
            kind: UnitKind::Fcu,
        });
    }
    config
        .zones
        .ahu_lookup
        .get(unit)
        .map(|column| SensorColumn {
            unit: unit.to_string(),
            column: column.clone(),
            kind: UnitKind::Ahu,
        })
        .ok_or_else(|| AuditError::UnknownControlUnit {
            unit: unit.to_string(),
        })
}

/// Builds the declared schema for a set of rooms: one sensor column per
/// distinct control unit, in first-seen order.
///
/// # Errors
///
/// Returns `UnknownControlUnit` for the first room whose unit cannot be
/// resolved.
pub fn declared_schema(
    rooms: &[RoomInfo],
    config: &BuildingConfig,
) -> Result<Vec<SensorColumn>, AuditError> {
    let mut schema: Vec<SensorColumn> = Vec::new();
    for room in rooms {
        if schema.iter().any(|s| s.unit == room.unit) {
            continue;
        }
        schema.push(resolve_zone_column(&room.unit, config)?);
    }
    Ok(schema)
}

/// Validates a declared schema against a temperature table, failing fast on
/// the first declared column the table does not carry.
///
/// # Errors
///
/// Returns `MissingColumn` naming the absent column.
pub fn validate_schema(schema: &[SensorColumn], temps: &TimeTable) -> Result<(), AuditError> {
    for sensor in schema {
        if !temps.has_column(&sensor.column) {
            return Err(AuditError::MissingColumn {
                column: sensor.column.clone(),
            });
        }
    }
    Ok(())
}

/// Infers the set of control units from temperature-table column names.
///
/// Legacy discovery path: columns named in the AHU lookup map back to their
/// unit id, every other `… ZnTmp*` column contributes its prefix; the
/// configured non-zone columns and the corridor unit (its footprint is not
/// fixed) are skipped. Every returned unit resolves back through
/// [`resolve_zone_column`]. Prefer [`declared_schema`] + [`validate_schema`],
/// which fail fast instead of silently excluding columns.
pub fn units_from_columns(temps: &TimeTable, config: &BuildingConfig) -> Vec<String> {
    let mut units = Vec::new();
    for name in temps.column_names() {
        if config.zones.non_zone_columns.iter().any(|c| c == name) {
            continue;
        }
        let unit = config
            .zones
            .ahu_lookup
            .iter()
            .find(|(_, column)| column.as_str() == name)
            .map(|(unit, _)| unit.clone())
            .or_else(|| name.find(ZN_TMP_SUFFIX).map(|split| name[..split].to_string()));
        let Some(unit) = unit else {
            continue;
        };
        if unit == config.zones.corridor_unit {
            continue;
        }
        if !units.contains(&unit) {
            units.push(unit);
        }
    }
    units
}
