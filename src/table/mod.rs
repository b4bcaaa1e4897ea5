//! Time-indexed tables the audit pipeline operates on.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::error::AuditError;

pub mod raw;

pub use raw::RawTable;

/// One named column of optional readings. `None` marks a missing reading.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Column {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column values, one per table row.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// A table of numeric readings indexed by timestamp.
///
/// Rows are unique by timestamp and chronologically ordered for tables built
/// from BMS exports; the operations here preserve row order. All derived
/// tables (cleaned temperatures, per-room energy flows) share this shape.
#[derive(Debug, Clone)]
pub struct TimeTable {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl TimeTable {
    /// Creates an empty table over the given timestamp index.
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamps,
            columns: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// True if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Timestamp index.
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// True if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Values of the named column.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if no column has this name.
    pub fn column(&self, name: &str) -> Result<&[Option<f64>], AuditError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| AuditError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateColumn` if the name is already present, or
    /// `LengthMismatch` if the values do not cover every row.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), AuditError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(AuditError::DuplicateColumn { column: name });
        }
        if values.len() != self.timestamps.len() {
            return Err(AuditError::LengthMismatch {
                column: name,
                expected: self.timestamps.len(),
                actual: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Joins two tables on exact timestamp equality (inner join).
    ///
    /// Keeps this table's row order. Rows without a match on the other side
    /// are dropped and counted at debug level. Columns of `other` whose name
    /// already exists here are dropped with a warning — this is what removes
    /// the duplicate outdoor-temperature/humidity columns a merge of several
    /// logs would otherwise introduce.
    pub fn inner_join(&self, other: &TimeTable) -> TimeTable {
        let mut other_rows: HashMap<NaiveDateTime, usize> = HashMap::with_capacity(other.len());
        for (i, ts) in other.timestamps.iter().enumerate() {
            other_rows.entry(*ts).or_insert(i);
        }

        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        let mut timestamps = Vec::new();
        for (i, ts) in self.timestamps.iter().enumerate() {
            if let Some(&j) = other_rows.get(ts) {
                left_rows.push(i);
                right_rows.push(j);
                timestamps.push(*ts);
            }
        }

        // Duplicate left timestamps can each match the same right row, so
        // count unmatched rows per side rather than from the joined length.
        let matched: HashSet<NaiveDateTime> = timestamps.iter().copied().collect();
        let dropped = (self.len() - timestamps.len())
            + other
                .timestamps
                .iter()
                .filter(|ts| !matched.contains(ts))
                .count();
        if dropped > 0 {
            debug!(dropped, "inner join dropped unmatched rows");
        }

        let mut joined = TimeTable::new(timestamps);
        for col in &self.columns {
            let values = left_rows.iter().map(|&i| col.values[i]).collect();
            joined.columns.push(Column {
                name: col.name.clone(),
                values,
            });
        }
        for col in &other.columns {
            if joined.has_column(&col.name) {
                warn!(column = %col.name, "dropping duplicate column from joined table");
                continue;
            }
            let values = right_rows.iter().map(|&j| col.values[j]).collect();
            joined.columns.push(Column {
                name: col.name.clone(),
                values,
            });
        }
        joined
    }

    /// Rewrites every column name through `f`.
    pub fn rename_columns(&mut self, f: impl Fn(&str) -> String) {
        for col in &mut self.columns {
            col.name = f(&col.name);
        }
    }

    /// Removes the named columns. Names not present are ignored.
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
    }

    /// Restricts rows to the inclusive date range `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeEmpty` if no row falls inside the range.
    pub fn restrict_dates(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<TimeTable, AuditError> {
        let keep: Vec<usize> = self
            .timestamps
            .iter()
            .enumerate()
            .filter(|(_, ts)| **ts >= start && **ts <= end)
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(AuditError::DateRangeEmpty);
        }
        Ok(self.take_rows(&keep))
    }

    /// Resamples to a fixed interval, taking the first reading per bucket.
    ///
    /// Buckets are aligned to the frequency grid (midnight-anchored). The
    /// output has exactly one row per interval from the first to the last
    /// occupied bucket; intervals with no reading become all-missing rows.
    pub fn resample_first(&self, freq_minutes: u32) -> TimeTable {
        if self.is_empty() || freq_minutes == 0 {
            return self.clone();
        }
        let step = i64::from(freq_minutes) * 60;
        let floor = |ts: &NaiveDateTime| -> i64 {
            let secs = ts.and_utc().timestamp();
            secs - secs.rem_euclid(step)
        };

        let first = self.timestamps.iter().map(&floor).min().unwrap_or(0);
        let last = self.timestamps.iter().map(&floor).max().unwrap_or(0);
        let buckets = ((last - first) / step + 1) as usize;

        let mut timestamps = Vec::with_capacity(buckets);
        for i in 0..buckets {
            let secs = first + i as i64 * step;
            let ts = chrono::DateTime::from_timestamp(secs, 0)
                .map(|d| d.naive_utc())
                .unwrap_or(self.timestamps[0]);
            timestamps.push(ts);
        }

        // First row wins within each bucket.
        let mut row_for_bucket: Vec<Option<usize>> = vec![None; buckets];
        for (i, ts) in self.timestamps.iter().enumerate() {
            let b = ((floor(ts) - first) / step) as usize;
            if row_for_bucket[b].is_none() {
                row_for_bucket[b] = Some(i);
            }
        }

        let mut resampled = TimeTable::new(timestamps);
        for col in &self.columns {
            let values = row_for_bucket
                .iter()
                .map(|row| row.and_then(|i| col.values[i]))
                .collect();
            resampled.columns.push(Column {
                name: col.name.clone(),
                values,
            });
        }
        resampled
    }

    /// Restricts rows to the inclusive time-of-day window `[start, end]`.
    ///
    /// Windows wrapping midnight (`start > end`) are supported.
    pub fn between_time(&self, start: NaiveTime, end: NaiveTime) -> TimeTable {
        let keep: Vec<usize> = self
            .timestamps
            .iter()
            .enumerate()
            .filter(|(_, ts)| {
                let t = ts.time();
                if start <= end {
                    t >= start && t <= end
                } else {
                    t >= start || t <= end
                }
            })
            .map(|(i, _)| i)
            .collect();
        self.take_rows(&keep)
    }

    /// Sorts columns alphabetically by name.
    pub fn sort_columns_by_name(&mut self) {
        self.columns.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Drops every row with a missing value in any column.
    pub fn drop_incomplete_rows(&self) -> TimeTable {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.columns.iter().all(|c| c.values[i].is_some()))
            .collect();
        self.take_rows(&keep)
    }

    fn take_rows(&self, rows: &[usize]) -> TimeTable {
        let timestamps = rows.iter().map(|&i| self.timestamps[i]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: rows.iter().map(|&i| c.values[i]).collect(),
            })
            .collect();
        TimeTable {
            timestamps,
            columns,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 2, day)
            .and_then(|d| d.and_hms_opt(hour, min, 0))
            .expect("valid test timestamp")
    }

    fn table(times: &[NaiveDateTime], cols: &[(&str, &[Option<f64>])]) -> TimeTable {
        let mut t = TimeTable::new(times.to_vec());
        for (name, values) in cols {
            t.push_column(*name, values.to_vec()).expect("push column");
        }
        t
    }

    #[test]
    fn join_keeps_only_shared_timestamps() {
        let a = table(
            &[ts(2, 6, 0), ts(2, 6, 5), ts(2, 6, 10)],
            &[("x", &[Some(1.0), Some(2.0), Some(3.0)])],
        );
        let b = table(
            &[ts(2, 6, 5), ts(2, 6, 10), ts(2, 6, 15)],
            &[("y", &[Some(4.0), Some(5.0), Some(6.0)])],
        );
        let j = a.inner_join(&b);
        assert_eq!(j.len(), 2);
        assert_eq!(j.timestamps(), &[ts(2, 6, 5), ts(2, 6, 10)]);
        assert_eq!(j.column("x").as_deref(), Ok(&[Some(2.0), Some(3.0)][..]));
        assert_eq!(j.column("y").as_deref(), Ok(&[Some(4.0), Some(5.0)][..]));
    }

    #[test]
    fn join_tolerates_duplicate_left_timestamps() {
        // Dirty exports can repeat a timestamp; each copy matches the same
        // right-hand row.
        let a = table(
            &[ts(2, 6, 0), ts(2, 6, 0)],
            &[("x", &[Some(1.0), Some(2.0)])],
        );
        let b = table(&[ts(2, 6, 0)], &[("y", &[Some(9.0)])]);
        let j = a.inner_join(&b);
        assert_eq!(j.len(), 2);
        assert_eq!(j.column("x").as_deref(), Ok(&[Some(1.0), Some(2.0)][..]));
        assert_eq!(j.column("y").as_deref(), Ok(&[Some(9.0), Some(9.0)][..]));
    }

    #[test]
    fn join_drops_duplicate_columns_from_right() {
        let a = table(&[ts(2, 6, 0)], &[("OaTmp", &[Some(10.0)])]);
        let b = table(
            &[ts(2, 6, 0)],
            &[("OaTmp", &[Some(99.0)]), ("z", &[Some(1.0)])],
        );
        let j = a.inner_join(&b);
        assert_eq!(j.column_names(), vec!["OaTmp", "z"]);
        // Left side wins.
        assert_eq!(j.column("OaTmp").as_deref(), Ok(&[Some(10.0)][..]));
    }

    #[test]
    fn push_column_rejects_duplicates_and_bad_lengths() {
        let mut t = TimeTable::new(vec![ts(2, 6, 0)]);
        t.push_column("a", vec![Some(1.0)]).expect("first push");
        assert_eq!(
            t.push_column("a", vec![Some(2.0)]),
            Err(AuditError::DuplicateColumn {
                column: "a".to_string()
            })
        );
        assert!(matches!(
            t.push_column("b", vec![]),
            Err(AuditError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn restrict_dates_is_inclusive() {
        let t = table(
            &[ts(2, 6, 0), ts(3, 6, 0), ts(4, 6, 0)],
            &[("x", &[Some(1.0), Some(2.0), Some(3.0)])],
        );
        let r = t.restrict_dates(ts(2, 6, 0), ts(3, 6, 0)).expect("rows");
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn restrict_dates_empty_is_an_error() {
        let t = table(&[ts(2, 6, 0)], &[("x", &[Some(1.0)])]);
        let result = t.restrict_dates(ts(10, 0, 0), ts(11, 0, 0));
        assert!(matches!(result, Err(AuditError::DateRangeEmpty)));
    }

    #[test]
    fn resample_takes_first_reading_per_bucket() {
        // 5-minute readings resampled to 15 minutes.
        let t = table(
            &[
                ts(2, 6, 0),
                ts(2, 6, 5),
                ts(2, 6, 10),
                ts(2, 6, 15),
                ts(2, 6, 20),
            ],
            &[(
                "x",
                &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            )],
        );
        let r = t.resample_first(15);
        assert_eq!(r.len(), 2);
        assert_eq!(r.timestamps(), &[ts(2, 6, 0), ts(2, 6, 15)]);
        assert_eq!(r.column("x").as_deref(), Ok(&[Some(1.0), Some(4.0)][..]));
    }

    #[test]
    fn resample_fills_empty_buckets_with_missing() {
        let t = table(
            &[ts(2, 6, 0), ts(2, 6, 30)],
            &[("x", &[Some(1.0), Some(2.0)])],
        );
        let r = t.resample_first(15);
        assert_eq!(r.len(), 3);
        assert_eq!(
            r.column("x").as_deref(),
            Ok(&[Some(1.0), None, Some(2.0)][..])
        );
    }

    #[test]
    fn resample_aligns_to_the_frequency_grid() {
        let t = table(&[ts(2, 6, 7)], &[("x", &[Some(1.0)])]);
        let r = t.resample_first(15);
        assert_eq!(r.timestamps(), &[ts(2, 6, 0)]);
    }

    #[test]
    fn between_time_is_inclusive_of_both_bounds() {
        let t = table(
            &[ts(2, 5, 59), ts(2, 6, 0), ts(2, 18, 0), ts(2, 18, 1)],
            &[("x", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)])],
        );
        let start = NaiveTime::from_hms_opt(6, 0, 0).expect("time");
        let end = NaiveTime::from_hms_opt(18, 0, 0).expect("time");
        let w = t.between_time(start, end);
        assert_eq!(w.len(), 2);
        assert_eq!(w.timestamps(), &[ts(2, 6, 0), ts(2, 18, 0)]);
    }

    #[test]
    fn between_time_supports_wrapping_windows() {
        let t = table(
            &[ts(2, 5, 0), ts(2, 12, 0), ts(2, 23, 0)],
            &[("x", &[Some(1.0), Some(2.0), Some(3.0)])],
        );
        let start = NaiveTime::from_hms_opt(22, 0, 0).expect("time");
        let end = NaiveTime::from_hms_opt(6, 0, 0).expect("time");
        let w = t.between_time(start, end);
        assert_eq!(w.timestamps(), &[ts(2, 5, 0), ts(2, 23, 0)]);
    }

    #[test]
    fn drop_incomplete_rows_removes_any_missing() {
        let t = table(
            &[ts(2, 6, 0), ts(2, 6, 15), ts(2, 6, 30)],
            &[
                ("x", &[Some(1.0), None, Some(3.0)]),
                ("y", &[Some(1.0), Some(2.0), Some(3.0)]),
            ],
        );
        let d = t.drop_incomplete_rows();
        assert_eq!(d.len(), 2);
        assert_eq!(d.timestamps(), &[ts(2, 6, 0), ts(2, 6, 30)]);
    }

    #[test]
    fn sort_columns_is_alphabetical() {
        let mut t = table(
            &[ts(2, 6, 0)],
            &[("Room B", &[Some(1.0)]), ("Room A", &[Some(2.0)])],
        );
        t.sort_columns_by_name();
        assert_eq!(t.column_names(), vec!["Room A", "Room B"]);
    }

    #[test]
    fn rename_and_drop_columns() {
        let mut t = table(
            &[ts(2, 6, 0)],
            &[
                ("FCU-01 ZnTmp Extended Trend Log", &[Some(21.0)]),
                ("hour", &[Some(6.0)]),
            ],
        );
        t.rename_columns(|n| n.replace(" Extended Trend Log", ""));
        t.drop_columns(&["hour"]);
        assert_eq!(t.column_names(), vec!["FCU-01 ZnTmp"]);
    }
}
