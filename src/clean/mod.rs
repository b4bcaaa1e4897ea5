//! Cleaning of raw BMS exports into normalized tables.

pub mod power;
pub mod rooms;
pub mod temperature;
