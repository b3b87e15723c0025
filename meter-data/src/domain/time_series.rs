use time::{Duration, PrimitiveDateTime};

use crate::error::TableError;

/// Nominal sampling step of half-hourly meter data.
pub const HALF_HOUR: Duration = Duration::minutes(30);

/// A named numeric column. Missing readings are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new<N: Into<String>>(name: N, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Timestamp-indexed numeric table, one column per meter.
///
/// Construction guarantees that the index is strictly increasing and that
/// every column has one value per index entry. Gaps between timestamps are
/// allowed; callers that care about them compare successive deltas against
/// the nominal step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesTable {
    index: Vec<PrimitiveDateTime>,
    columns: Vec<Column>,
}

impl TimeSeriesTable {
    pub fn new(index: Vec<PrimitiveDateTime>, columns: Vec<Column>) -> Result<Self, TableError> {
        for (position, pair) in index.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TableError::UnorderedIndex {
                    position: position + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }

        let mut table = Self {
            index,
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Single-column table from `(timestamp, value)` pairs already in order.
    pub fn from_series<N: Into<String>>(
        name: N,
        readings: Vec<(PrimitiveDateTime, f64)>,
    ) -> Result<Self, TableError> {
        let (index, values): (Vec<_>, Vec<_>) = readings.into_iter().unzip();
        Self::new(index, vec![Column::new(name, values)])
    }

    fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        if column.values.len() != self.index.len() {
            return Err(TableError::LengthMismatch {
                name: column.name,
                expected: self.index.len(),
                actual: column.values.len(),
            });
        }
        if self.has_column(&column.name) {
            return Err(TableError::DuplicateColumn(column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn index(&self) -> &[PrimitiveDateTime] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64], TableError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Returns a copy with `column` appended, or replacing a column of the
    /// same name.
    pub fn with_column(&self, column: Column) -> Result<Self, TableError> {
        let mut out = self.clone();
        out.columns.retain(|c| c.name != column.name);
        out.push_column(column)?;
        Ok(out)
    }

    /// Copy of the rows whose timestamp satisfies `keep`.
    pub fn filter_rows<F>(&self, keep: F) -> Self
    where
        F: Fn(PrimitiveDateTime) -> bool,
    {
        let mask: Vec<bool> = self.index.iter().map(|ts| keep(*ts)).collect();
        let index = self
            .index
            .iter()
            .zip(&mask)
            .filter(|(_, k)| **k)
            .map(|(ts, _)| *ts)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c
                    .values
                    .iter()
                    .zip(&mask)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| *v)
                    .collect(),
            })
            .collect();
        Self { index, columns }
    }
}

/// Hours elapsed between two readings.
pub fn gap_hours(previous: PrimitiveDateTime, current: PrimitiveDateTime) -> f64 {
    (current - previous).as_seconds_f64() / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn two_rows() -> TimeSeriesTable {
        TimeSeriesTable::new(
            vec![datetime!(2023-01-01 00:00), datetime!(2023-01-01 00:30)],
            vec![Column::new("m-1", vec![1.0, 2.0])],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_out_of_order_index() {
        let res = TimeSeriesTable::new(
            vec![datetime!(2023-01-01 01:00), datetime!(2023-01-01 00:30)],
            vec![],
        );
        assert!(matches!(res, Err(TableError::UnorderedIndex { position: 1, .. })));
    }

    #[test]
    fn new_rejects_duplicate_timestamps() {
        let res = TimeSeriesTable::new(
            vec![datetime!(2023-01-01 00:30), datetime!(2023-01-01 00:30)],
            vec![],
        );
        assert!(matches!(res, Err(TableError::UnorderedIndex { .. })));
    }

    #[test]
    fn new_rejects_short_column() {
        let res = TimeSeriesTable::new(
            vec![datetime!(2023-01-01 00:00), datetime!(2023-01-01 00:30)],
            vec![Column::new("m-1", vec![1.0])],
        );
        assert_eq!(
            res,
            Err(TableError::LengthMismatch {
                name: "m-1".to_string(),
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn column_lookup_reports_missing_name() {
        let table = two_rows();
        assert_eq!(table.column("m-1").unwrap(), &[1.0, 2.0]);
        assert_eq!(
            table.column("m-2"),
            Err(TableError::MissingColumn("m-2".to_string()))
        );
    }

    #[test]
    fn with_column_replaces_and_leaves_original_untouched() {
        let table = two_rows();
        let replaced = table.with_column(Column::new("m-1", vec![5.0, 6.0])).unwrap();
        assert_eq!(replaced.column("m-1").unwrap(), &[5.0, 6.0]);
        assert_eq!(table.column("m-1").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn filter_rows_keeps_columns_aligned() {
        let table = two_rows();
        let late = table.filter_rows(|ts| ts.minute() == 30);
        assert_eq!(late.index(), &[datetime!(2023-01-01 00:30)]);
        assert_eq!(late.column("m-1").unwrap(), &[2.0]);
    }

    #[test]
    fn gap_hours_measures_half_hour_steps() {
        assert_eq!(
            gap_hours(datetime!(2023-01-01 00:00), datetime!(2023-01-01 00:30)),
            0.5
        );
    }
}
