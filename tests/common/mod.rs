//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use therm_audit::clean::rooms::RoomInfo;
use therm_audit::config::BuildingConfig;
use therm_audit::table::TimeTable;

/// Timestamp on 2020-02-10 at the given hour and minute.
pub fn ts(hour: u32, min: u32) -> NaiveDateTime {
    ts_on(10, hour, min)
}

/// Timestamp on the given February 2020 day.
pub fn ts_on(day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 2, day)
        .and_then(|d| d.and_hms_opt(hour, min, 0))
        .expect("valid test timestamp")
}

/// Default building configuration.
pub fn default_config() -> BuildingConfig {
    BuildingConfig::default()
}

/// Two rooms on FCU units plus one basement room on an AHU.
pub fn default_rooms() -> Vec<RoomInfo> {
    vec![
        RoomInfo {
            name: "Reception".to_string(),
            unit: "FCU-01".to_string(),
            area_m2: 20.0,
            external_wall_m: 5.0,
        },
        RoomInfo {
            name: "Meeting Rm 1".to_string(),
            unit: "FCU-02".to_string(),
            area_m2: 12.5,
            external_wall_m: 3.0,
        },
        RoomInfo {
            name: "Basement Hall".to_string(),
            unit: "AHU-B1-01".to_string(),
            area_m2: 80.0,
            external_wall_m: 0.0,
        },
    ]
}

/// A full day of 15-minute readings (00:00–23:45) for the default rooms.
///
/// Outdoor temperature ramps from 8 °C at midnight by 0.1 °C per interval;
/// zone temperatures are constant (FCU-01 21 °C, FCU-02 23 °C, corridor
/// FCU-24 24 °C, basement AHU 19 °C).
pub fn full_day_temps() -> TimeTable {
    let mut timestamps = Vec::new();
    let mut outdoor = Vec::new();
    for i in 0..96 {
        timestamps.push(ts((i / 4) as u32, ((i % 4) * 15) as u32));
        outdoor.push(Some(8.0 + 0.1 * i as f64));
    }
    let n = timestamps.len();
    let mut t = TimeTable::new(timestamps);
    t.push_column("OaTmp", outdoor).expect("column");
    t.push_column("OaRH", vec![Some(55.0); n]).expect("column");
    t.push_column("FCU-01 ZnTmp", vec![Some(21.0); n])
        .expect("column");
    t.push_column("FCU-02 ZnTmp", vec![Some(23.0); n])
        .expect("column");
    t.push_column("FCU-24 ZnTmp", vec![Some(24.0); n])
        .expect("column");
    t.push_column("AHU-B1-01 ZnTmp_1", vec![Some(19.0); n])
        .expect("column");
    t
}
