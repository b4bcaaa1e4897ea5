//! TOML-based building configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::error::AuditError;

/// Top-level building configuration parsed from TOML.
///
/// All fields default to the values of the building the audit data set was
/// exported from. Load from TOML with [`BuildingConfig::from_toml_file`] or
/// use [`BuildingConfig::default`] for the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildingConfig {
    /// Valid-date window of the telemetry export.
    pub date_range: DateRangeConfig,
    /// Sampling interval parameters.
    pub sampling: SamplingConfig,
    /// Operating time-of-day window.
    pub operating_hours: OperatingHoursConfig,
    /// Building fabric constants.
    pub fabric: FabricConfig,
    /// Air infiltration constants.
    pub air: AirConfig,
    /// Zone-sensor resolution and discovery parameters.
    pub zones: ZonesConfig,
    /// Chiller/boiler telemetry markers.
    pub power: PowerConfig,
}

/// Valid-date window of the telemetry export (inclusive bounds).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateRangeConfig {
    /// First valid timestamp, `yyyy-MM-dd HH:mm:ss`.
    pub start: String,
    /// Last valid timestamp, `yyyy-MM-dd HH:mm:ss`.
    pub end: String,
}

impl Default for DateRangeConfig {
    fn default() -> Self {
        // The north FCU log starts 2020-02-02 01:10, which limits all sets.
        Self {
            start: "2020-02-02 01:10:00".to_string(),
            end: "2020-02-29 23:59:59".to_string(),
        }
    }
}

/// Sampling interval parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    /// Resampling interval in minutes (must be > 0).
    pub freq_minutes: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { freq_minutes: 15 }
    }
}

/// Operating time-of-day window (inclusive bounds, `HH:MM`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatingHoursConfig {
    /// Window start, `HH:MM`.
    pub start: String,
    /// Window end, `HH:MM`.
    pub end: String,
}

impl Default for OperatingHoursConfig {
    fn default() -> Self {
        Self {
            start: "06:00".to_string(),
            end: "18:00".to_string(),
        }
    }
}

/// Building fabric constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FabricConfig {
    /// Glazing U-value (W/m²K), assuming 4mm / 16mm air / 4mm units.
    pub u_glass: f64,
    /// Concrete U-value (W/m²K).
    pub u_concrete: f64,
    /// Wall height used for transfer area (m), approx. one storey.
    pub wall_height_m: f64,
    /// Ceiling height used for room air volume (m).
    pub ceiling_height_m: f64,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            u_glass: 2.7,
            u_concrete: 1.45,
            wall_height_m: 3.3,
            ceiling_height_m: 2.7,
        }
    }
}

/// Air infiltration constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirConfig {
    /// Dry-air specific heat capacity (J/(g·K)).
    pub specific_heat_j_per_g_k: f64,
    /// Air density (g/m³).
    pub density_g_per_m3: f64,
    /// Envelope air permeability (L/h).
    pub permeability_l_per_h: f64,
    /// Reference period the leak fraction is normalized over (hours).
    pub leak_reference_hours: f64,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            specific_heat_j_per_g_k: 1.012,
            density_g_per_m3: 1225.0,
            permeability_l_per_h: 0.8,
            leak_reference_hours: 20.0,
        }
    }
}

/// Zone-sensor resolution and discovery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZonesConfig {
    /// Corridor reference unit for internal-wall heat exchange. Excluded
    /// from unit discovery because its footprint is not fixed.
    pub corridor_unit: String,
    /// Zone-temperature column for units without the FCU naming pattern.
    pub ahu_lookup: BTreeMap<String, String>,
    /// Columns that are not zone-temperature sensors (discovery exclusions).
    pub non_zone_columns: Vec<String>,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        let mut ahu_lookup = BTreeMap::new();
        ahu_lookup.insert("AHU-01".to_string(), "AHU-01 Internal ZnTmp_1".to_string());
        ahu_lookup.insert("AHU-B1-01".to_string(), "AHU-B1-01 ZnTmp_1".to_string());
        ahu_lookup.insert("AHU-B1-02".to_string(), "AHU-B1-02 ZnTmp_1".to_string());
        Self {
            corridor_unit: "FCU-24".to_string(),
            ahu_lookup,
            non_zone_columns: vec!["OaTmp".to_string(), "OaRH".to_string()],
        }
    }
}

/// Chiller/boiler telemetry markers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PowerConfig {
    /// Column-name prefix of chiller power columns.
    pub chiller_prefix: String,
    /// Column-name prefix of boiler power columns.
    pub boiler_prefix: String,
    /// Known-erroneous timestamp whose row is zeroed before summing,
    /// `yyyy-MM-dd HH:mm:ss`.
    pub sentinel_timestamp: String,
}

impl Default for PowerConfig {
    fn default() -> Self {
        // The doubled space in the boiler prefix is present in the export.
        Self {
            chiller_prefix: "LTB CH".to_string(),
            boiler_prefix: "LTB  BLR".to_string(),
            sentinel_timestamp: "2020-02-28 01:00:00".to_string(),
        }
    }
}

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FMT: &str = "%H:%M";

fn parse_datetime(s: &str, field: &str) -> Result<NaiveDateTime, AuditError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).map_err(|e| AuditError::InvalidConfig {
        field: field.to_string(),
        message: format!("\"{s}\" is not a yyyy-MM-dd HH:mm:ss timestamp ({e})"),
    })
}

fn parse_time(s: &str, field: &str) -> Result<NaiveTime, AuditError> {
    NaiveTime::parse_from_str(s, TIME_FMT).map_err(|e| AuditError::InvalidConfig {
        field: field.to_string(),
        message: format!("\"{s}\" is not an HH:MM time ({e})"),
    })
}

impl BuildingConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an `AuditError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, AuditError> {
        let content = fs::read_to_string(path).map_err(|e| AuditError::InvalidConfig {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an `AuditError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, AuditError> {
        toml::from_str(s).map_err(|e| AuditError::InvalidConfig {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Parsed start of the valid-date window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configured string does not parse.
    pub fn date_start(&self) -> Result<NaiveDateTime, AuditError> {
        parse_datetime(&self.date_range.start, "date_range.start")
    }

    /// Parsed end of the valid-date window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configured string does not parse.
    pub fn date_end(&self) -> Result<NaiveDateTime, AuditError> {
        parse_datetime(&self.date_range.end, "date_range.end")
    }

    /// Parsed start of the operating time-of-day window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configured string does not parse.
    pub fn window_start(&self) -> Result<NaiveTime, AuditError> {
        parse_time(&self.operating_hours.start, "operating_hours.start")
    }

    /// Parsed end of the operating time-of-day window.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configured string does not parse.
    pub fn window_end(&self) -> Result<NaiveTime, AuditError> {
        parse_time(&self.operating_hours.end, "operating_hours.end")
    }

    /// Parsed sentinel timestamp of the power log.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configured string does not parse.
    pub fn power_sentinel(&self) -> Result<NaiveDateTime, AuditError> {
        parse_datetime(&self.power.sentinel_timestamp, "power.sentinel_timestamp")
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<AuditError> {
        let mut errors = Vec::new();

        let start = self.date_start();
        let end = self.date_end();
        if let Err(e) = &start {
            errors.push(e.clone());
        }
        if let Err(e) = &end {
            errors.push(e.clone());
        }
        if let (Ok(s), Ok(e)) = (&start, &end) {
            if s >= e {
                errors.push(AuditError::InvalidConfig {
                    field: "date_range.start".to_string(),
                    message: "must be before date_range.end".to_string(),
                });
            }
        }

        let wstart = self.window_start();
        let wend = self.window_end();
        if let Err(e) = &wstart {
            errors.push(e.clone());
        }
        if let Err(e) = &wend {
            errors.push(e.clone());
        }
        // Wrapping windows (start > end) are fine; an equal pair collapses
        // the window to a single instant.
        if let (Ok(s), Ok(e)) = (&wstart, &wend) {
            if s == e {
                errors.push(AuditError::InvalidConfig {
                    field: "operating_hours.start".to_string(),
                    message: "must differ from operating_hours.end".to_string(),
                });
            }
        }
        if let Err(e) = self.power_sentinel() {
            errors.push(e);
        }

        if self.sampling.freq_minutes == 0 {
            errors.push(AuditError::InvalidConfig {
                field: "sampling.freq_minutes".to_string(),
                message: "must be > 0".to_string(),
            });
        }

        let f = &self.fabric;
        for (field, value) in [
            ("fabric.u_glass", f.u_glass),
            ("fabric.u_concrete", f.u_concrete),
            ("fabric.wall_height_m", f.wall_height_m),
            ("fabric.ceiling_height_m", f.ceiling_height_m),
        ] {
            if value <= 0.0 {
                errors.push(AuditError::InvalidConfig {
                    field: field.to_string(),
                    message: "must be > 0".to_string(),
                });
            }
        }

        let a = &self.air;
        for (field, value) in [
            ("air.specific_heat_j_per_g_k", a.specific_heat_j_per_g_k),
            ("air.density_g_per_m3", a.density_g_per_m3),
            ("air.leak_reference_hours", a.leak_reference_hours),
        ] {
            if value <= 0.0 {
                errors.push(AuditError::InvalidConfig {
                    field: field.to_string(),
                    message: "must be > 0".to_string(),
                });
            }
        }
        if a.permeability_l_per_h < 0.0 {
            errors.push(AuditError::InvalidConfig {
                field: "air.permeability_l_per_h".to_string(),
                message: "must be >= 0".to_string(),
            });
        }

        if self.zones.corridor_unit.is_empty() {
            errors.push(AuditError::InvalidConfig {
                field: "zones.corridor_unit".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        errors
    }
}
