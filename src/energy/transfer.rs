//! Room heat-transfer calculator.
//!
//! One parameterized formula covers every variant: conductive transfer
//! through selectable fabric terms, the thermal-mass energy change of the
//! room air, or infiltration-driven exchange in air-leak mode.
//!
//! Sign convention: temperature differentials are reference minus zone
//! (outdoor − zone for the external term, corridor − zone for internal
//! terms), so positive kilojoule values mean heat flowing *into* the room.

use chrono::NaiveDateTime;

use crate::clean::rooms::RoomInfo;
use crate::config::BuildingConfig;
use crate::error::AuditError;
use crate::schema::resolve_zone_column;
use crate::table::TimeTable;

/// Outdoor-temperature column of the cleaned temperature table.
pub const OUTDOOR_TEMP_COLUMN: &str = "OaTmp";

/// Which conductive paths contribute to a room's energy flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConductionTerms {
    /// External glazing facing outdoors.
    pub external_glazing: bool,
    /// Internal glazing facing the corridor reference zone, same length as
    /// the external wall.
    pub internal_glazing: bool,
    /// Internal concrete wall facing the corridor reference zone, at twice
    /// the external wall's length (two-sided).
    pub internal_concrete: bool,
}

impl ConductionTerms {
    /// External glazing only — the simple variant.
    pub fn external_only() -> Self {
        Self {
            external_glazing: true,
            internal_glazing: false,
            internal_concrete: false,
        }
    }

    /// All three conductive paths — the richer variant.
    pub fn full() -> Self {
        Self {
            external_glazing: true,
            internal_glazing: true,
            internal_concrete: true,
        }
    }

    fn needs_corridor(&self) -> bool {
        self.internal_glazing || self.internal_concrete
    }
}

/// Calculation mode for a room's energy series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcMode {
    /// Conductive transfer through the selected fabric terms.
    Conduction(ConductionTerms),
    /// Thermal-mass energy change of the room air, from the
    /// interval-to-interval zone temperature change.
    AirMass,
    /// Infiltration-driven exchange estimated from the interval-to-interval
    /// zone temperature change and the envelope permeability.
    AirLeak,
}

/// Per-interval energy flow of one room, in kilojoules.
///
/// Derived, not persisted: regenerated from the temperature table per query.
#[derive(Debug, Clone)]
pub struct EnergySeries {
    /// Room name.
    pub room: String,
    /// Interval timestamps, matching the source table rows.
    pub timestamps: Vec<NaiveDateTime>,
    /// Energy per interval (kJ); `None` where an input reading is missing.
    pub kilojoules: Vec<Option<f64>>,
}

/// Computes a room's energy series over the operating time-of-day window.
///
/// Restricts the temperature table to the configured window, then applies
/// [`energy_series`].
///
/// # Errors
///
/// Returns `UnknownControlUnit` if the room's unit cannot be resolved, or
/// `MissingColumn` if a required temperature column is absent.
pub fn room_energy(
    temps: &TimeTable,
    room: &RoomInfo,
    config: &BuildingConfig,
    mode: CalcMode,
) -> Result<EnergySeries, AuditError> {
    let windowed = temps.between_time(config.window_start()?, config.window_end()?);
    energy_series(&windowed, room, config, mode)
}

/// Computes a room's energy series over every row of `temps`.
///
/// The caller is responsible for any time-of-day restriction (the building
/// aggregator applies the operating window once for all rooms).
///
/// # Errors
///
/// Returns `UnknownControlUnit` if the room's unit cannot be resolved, or
/// `MissingColumn` if a required temperature column is absent.
pub fn energy_series(
    temps: &TimeTable,
    room: &RoomInfo,
    config: &BuildingConfig,
    mode: CalcMode,
) -> Result<EnergySeries, AuditError> {
    let sensor = resolve_zone_column(&room.unit, config)?;
    let zone = temps.column(&sensor.column)?;

    let kilojoules = match mode {
        CalcMode::Conduction(terms) => conduction_kj(temps, zone, room, config, terms)?,
        CalcMode::AirMass => air_change_kj(zone, room, config, false),
        CalcMode::AirLeak => air_change_kj(zone, room, config, true),
    };

    Ok(EnergySeries {
        room: room.name.clone(),
        timestamps: temps.timestamps().to_vec(),
        kilojoules,
    })
}

fn conduction_kj(
    temps: &TimeTable,
    zone: &[Option<f64>],
    room: &RoomInfo,
    config: &BuildingConfig,
    terms: ConductionTerms,
) -> Result<Vec<Option<f64>>, AuditError> {
    let fabric = &config.fabric;
    let transfer_area = room.external_wall_m * fabric.wall_height_m;
    let interval_s = f64::from(config.sampling.freq_minutes) * 60.0;

    let outdoor = if terms.external_glazing {
        Some(temps.column(OUTDOOR_TEMP_COLUMN)?)
    } else {
        None
    };
    let corridor = if terms.needs_corridor() {
        let sensor = resolve_zone_column(&config.zones.corridor_unit, config)?;
        Some(temps.column(&sensor.column)?)
    } else {
        None
    };

    let mut kilojoules = Vec::with_capacity(zone.len());
    for i in 0..zone.len() {
        let Some(zn) = zone[i] else {
            kilojoules.push(None);
            continue;
        };

        let mut watts = 0.0;
        let mut missing = false;

        if let Some(outdoor) = outdoor {
            match outdoor[i] {
                Some(oa) => watts += fabric.u_glass * transfer_area * (oa - zn),
                None => missing = true,
            }
        }
        if let Some(corridor) = corridor {
            match corridor[i] {
                Some(corr) => {
                    let delta_internal = corr - zn;
                    if terms.internal_glazing {
                        watts += fabric.u_glass * transfer_area * delta_internal;
                    }
                    if terms.internal_concrete {
                        watts += fabric.u_concrete * transfer_area * 2.0 * delta_internal;
                    }
                }
                None => missing = true,
            }
        }

        kilojoules.push(if missing {
            None
        } else {
            Some(watts * interval_s / 1000.0)
        });
    }
    Ok(kilojoules)
}

fn air_change_kj(
    zone: &[Option<f64>],
    room: &RoomInfo,
    config: &BuildingConfig,
    leak_limited: bool,
) -> Vec<Option<f64>> {
    let air = &config.air;
    let volume = room.area_m2 * config.fabric.ceiling_height_m;
    // Air-mass mode moves the whole room volume; air-leak mode only the
    // permeability-limited fraction of it.
    let fraction = if leak_limited {
        air.permeability_l_per_h * volume / (3600.0 * air.leak_reference_hours)
    } else {
        1.0
    };

    let mut kilojoules = Vec::with_capacity(zone.len());
    for i in 0..zone.len() {
        // Interval-to-interval change; the first interval has no
        // predecessor, so no value.
        let change = if i == 0 {
            None
        } else {
            match (zone[i], zone[i - 1]) {
                (Some(curr), Some(prev)) => Some(curr - prev),
                _ => None,
            }
        };
        kilojoules.push(change.map(|dt| {
            dt * air.specific_heat_j_per_g_k * air.density_g_per_m3 * volume * fraction / 1000.0
        }));
    }
    kilojoules
}
