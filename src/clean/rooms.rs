//! Static room-geometry metadata.

use std::io::Read;

use serde::Deserialize;

use crate::error::AuditError;

/// One physical room and its climate-control unit.
///
/// Field names map to the room-details CSV headers. The control unit must
/// resolve to exactly one zone-temperature column of the cleaned
/// temperature table (see [`crate::schema::resolve_zone_column`]).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RoomInfo {
    /// Room name, used as the column key in aggregated energy tables.
    #[serde(rename = "Room Name")]
    pub name: String,
    /// Control unit serving the room.
    #[serde(rename = "AHU / FCU")]
    pub unit: String,
    /// Floor area (m²).
    #[serde(rename = "Total Area")]
    pub area_m2: f64,
    /// External wall length (m). Zero means the room has no external
    /// envelope and contributes zero conduction energy.
    #[serde(rename = "External Wall Length")]
    pub external_wall_m: f64,
}

/// Reads room metadata from the room-details CSV.
///
/// The metadata file is hand-curated and needs no further cleaning.
///
/// # Errors
///
/// Returns a `Csv` error if the input is malformed or a field fails to
/// deserialize.
pub fn from_csv_reader(reader: impl Read) -> Result<Vec<RoomInfo>, AuditError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let mut rooms = Vec::new();
    for record in rdr.deserialize() {
        rooms.push(record?);
    }
    Ok(rooms)
}

/// Returns the rooms whose control unit is not in `excluded`.
///
/// Used when sensor columns have been removed from the temperature table
/// (faulty loggers), so their rooms must not be processed.
pub fn without_units(rooms: &[RoomInfo], excluded: &[&str]) -> Vec<RoomInfo> {
    rooms
        .iter()
        .filter(|r| !excluded.contains(&r.unit.as_str()))
        .cloned()
        .collect()
}
