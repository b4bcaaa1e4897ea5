//! Error taxonomy for the audit pipeline.

use std::error;
use std::fmt;

/// Failure modes of the audit computation.
///
/// Every fallible operation in the crate returns one of these. Rows that
/// fail a timestamp join are *not* errors — they are dropped with a logged
/// count (documented inner-join semantics). A room referencing an unknown
/// control unit or a declared column missing from the data is fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditError {
    /// A room's control unit is neither an FCU unit nor present in the
    /// configured zone lookup map.
    UnknownControlUnit {
        /// Unit id as given in the room metadata.
        unit: String,
    },
    /// A required column is absent from a table.
    MissingColumn {
        /// Column name that could not be resolved.
        column: String,
    },
    /// A date-range restriction matched zero rows.
    DateRangeEmpty,
    /// A telemetry cell failed numeric conversion.
    NonNumericValue {
        /// Column the cell belongs to.
        column: String,
        /// Offending cell contents.
        value: String,
    },
    /// A timestamp cell failed day-first parsing.
    InvalidTimestamp {
        /// Offending cell contents.
        value: String,
    },
    /// A column with this name already exists in the table.
    DuplicateColumn {
        /// Duplicated column name.
        column: String,
    },
    /// A column's length does not match the table index.
    LengthMismatch {
        /// Column being added.
        column: String,
        /// Index length.
        expected: usize,
        /// Column length.
        actual: usize,
    },
    /// A configuration field failed validation.
    InvalidConfig {
        /// Dotted field path (e.g., `"fabric.u_glass"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },
    /// CSV layer failure.
    Csv(String),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownControlUnit { unit } => {
                write!(f, "unknown control unit \"{unit}\"")
            }
            Self::MissingColumn { column } => {
                write!(f, "missing column \"{column}\"")
            }
            Self::DateRangeEmpty => write!(f, "date range matched no rows"),
            Self::NonNumericValue { column, value } => {
                write!(f, "non-numeric value \"{value}\" in column \"{column}\"")
            }
            Self::InvalidTimestamp { value } => {
                write!(f, "cannot parse timestamp \"{value}\"")
            }
            Self::DuplicateColumn { column } => {
                write!(f, "duplicate column \"{column}\"")
            }
            Self::LengthMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column \"{column}\" has {actual} rows, table index has {expected}"
            ),
            Self::InvalidConfig { field, message } => {
                write!(f, "config error: {field} — {message}")
            }
            Self::Csv(msg) => write!(f, "csv error: {msg}"),
        }
    }
}

impl error::Error for AuditError {}

impl From<csv::Error> for AuditError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_unit() {
        let e = AuditError::UnknownControlUnit {
            unit: "AHU-99".to_string(),
        };
        assert!(format!("{e}").contains("AHU-99"));
    }

    #[test]
    fn display_names_column_and_value() {
        let e = AuditError::NonNumericValue {
            column: "LTB CH 1".to_string(),
            value: "12,x4".to_string(),
        };
        let s = format!("{e}");
        assert!(s.contains("LTB CH 1"));
        assert!(s.contains("12,x4"));
    }
}
