/// CSV export for derived tables.
pub mod export;
