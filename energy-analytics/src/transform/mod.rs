use meter_data::{
    domain::TimeSeriesTable,
    query::{interval_energy_to_power, monthly_totals, select_years, with_total_column},
};
use time::{macros::datetime, Duration};

use crate::{error::AnalyticsError, pipeline::Transform};

/// Name of the column holding the sum of every meter.
pub const TOTAL_COLUMN: &str = "All";

/// Pure validation of a loaded table.
///
/// Rules:
/// - every timestamp must lie within the sanity window [2000-01-01, 2100-01-01).
/// - negative readings are counted and reported but kept.
pub fn validate_readings(table: &TimeSeriesTable) -> Result<usize, AnalyticsError> {
    let min_ts = datetime!(2000-01-01 00:00:00);
    let max_ts = datetime!(2100-01-01 00:00:00);

    if let Some(ts) = table.index().iter().find(|ts| **ts < min_ts || **ts >= max_ts) {
        return Err(AnalyticsError::Transform(format!("timestamp {ts} out of allowed range")));
    }

    let mut negative = 0;
    for column in table.columns() {
        let count = column.values.iter().filter(|v| **v < 0.0).count();
        if count > 0 {
            tracing::warn!(column = %column.name, count, "negative readings");
        }
        negative += count;
    }
    Ok(negative)
}

#[derive(Clone, Default)]
pub struct ReadingValidation;

impl Transform for ReadingValidation {
    fn name(&self) -> &'static str {
        "reading_validation"
    }

    fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
        match validate_readings(&input) {
            Ok(negative) => {
                metrics::counter!("validation_negative_readings_total").increment(negative as u64);
                Ok(input)
            }
            Err(e) => {
                metrics::counter!("validation_tables_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}

/// Keeps readings whose calendar year lies in `first..=last`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl Transform for YearRange {
    fn name(&self) -> &'static str {
        "year_range"
    }

    fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
        if self.first > self.last {
            return Err(AnalyticsError::Transform(format!(
                "year range {}-{} is empty",
                self.first, self.last
            )));
        }
        Ok(select_years(&input, self.first, self.last))
    }
}

/// Adds the row-wise total of all meters.
#[derive(Clone, Debug)]
pub struct TotalColumn {
    pub name: String,
}

impl Default for TotalColumn {
    fn default() -> Self {
        Self {
            name: TOTAL_COLUMN.to_string(),
        }
    }
}

impl Transform for TotalColumn {
    fn name(&self) -> &'static str {
        "total_column"
    }

    fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
        Ok(with_total_column(&input, &self.name)?)
    }
}

/// Sums every column per calendar month.
#[derive(Clone, Default)]
pub struct MonthlyResample;

impl Transform for MonthlyResample {
    fn name(&self) -> &'static str {
        "monthly_resample"
    }

    fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
        Ok(monthly_totals(&input)?)
    }
}

/// Replaces per-interval energy in `column` with average power.
#[derive(Clone, Debug)]
pub struct EnergyToPower {
    pub column: String,
    pub step: Duration,
}

impl Transform for EnergyToPower {
    fn name(&self) -> &'static str {
        "energy_to_power"
    }

    fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
        Ok(interval_energy_to_power(&input, &self.column, self.step)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_data::domain::{Column, HALF_HOUR};
    use time::macros::datetime;

    fn sample() -> TimeSeriesTable {
        TimeSeriesTable::new(
            vec![
                datetime!(2022-12-31 23:30),
                datetime!(2023-01-01 00:00),
                datetime!(2023-02-01 00:00),
            ],
            vec![
                Column::new("a", vec![1.0, 2.0, -3.0]),
                Column::new("b", vec![f64::NAN, 4.0, 5.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn validation_accepts_in_range_table_and_counts_negatives() {
        assert_eq!(validate_readings(&sample()).unwrap(), 1);
        assert!(ReadingValidation.apply(sample()).is_ok());
    }

    #[test]
    fn validation_rejects_out_of_range_ts() {
        let table =
            TimeSeriesTable::from_series("a", vec![(datetime!(1800-01-01 00:00), 1.0)]).unwrap();
        assert!(matches!(validate_readings(&table), Err(AnalyticsError::Transform(_))));

        let table =
            TimeSeriesTable::from_series("a", vec![(datetime!(2100-01-01 00:00), 1.0)]).unwrap();
        assert!(matches!(ReadingValidation.apply(table), Err(AnalyticsError::Transform(_))));
    }

    #[test]
    fn year_range_is_inclusive() {
        let out = YearRange { first: 2023, last: 2023 }.apply(sample()).unwrap();
        assert_eq!(out.len(), 2);
        assert!(YearRange { first: 2024, last: 2023 }.apply(sample()).is_err());
    }

    #[test]
    fn total_column_skips_missing_readings() {
        let out = TotalColumn::default().apply(sample()).unwrap();
        assert_eq!(out.column(TOTAL_COLUMN).unwrap(), &[1.0, 6.0, 2.0]);
    }

    #[test]
    fn monthly_resample_stamps_month_starts() {
        let out = MonthlyResample.apply(sample()).unwrap();
        assert_eq!(
            out.index(),
            &[
                datetime!(2022-12-01 00:00),
                datetime!(2023-01-01 00:00),
                datetime!(2023-02-01 00:00),
            ]
        );
        assert_eq!(out.column("b").unwrap(), &[0.0, 4.0, 5.0]);
    }

    #[test]
    fn energy_to_power_doubles_half_hourly_kwh() {
        let out = EnergyToPower {
            column: "a".to_string(),
            step: HALF_HOUR,
        }
        .apply(sample())
        .unwrap();
        assert_eq!(out.column("a").unwrap(), &[2.0, 4.0, -6.0]);
    }
}
