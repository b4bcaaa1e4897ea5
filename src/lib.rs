//! Building thermal-energy estimates from BMS sensor logs.
//!
//! Cleans raw temperature and chiller/boiler exports into time-indexed
//! tables, then derives per-room and building-wide heat-transfer estimates
//! in kilojoules over configurable date and operating-hours windows.

pub mod clean;
pub mod config;
/// Per-room heat-transfer calculation and building aggregation.
pub mod energy;
pub mod error;
pub mod io;
pub mod schema;
pub mod table;
