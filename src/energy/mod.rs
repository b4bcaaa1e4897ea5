//! Per-room and building-level energy-flow computation.

pub mod building;
pub mod transfer;

pub use building::{AggregateOptions, energy_to_building};
pub use transfer::{CalcMode, ConductionTerms, EnergySeries, energy_series, room_energy};
