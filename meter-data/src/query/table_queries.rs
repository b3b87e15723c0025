use time::{Date, Duration, PrimitiveDateTime, Time};

use crate::domain::{Column, TimeSeriesTable};
use crate::error::TableError;

/// Rows whose calendar year lies in `first..=last`.
pub fn select_years(table: &TimeSeriesTable, first: i32, last: i32) -> TimeSeriesTable {
    table.filter_rows(|ts| (first..=last).contains(&ts.year()))
}

/// Rows within `[centre - before, centre + after]`, used to plot the context
/// of a selected peak.
pub fn window_around(
    table: &TimeSeriesTable,
    centre: PrimitiveDateTime,
    before: Duration,
    after: Duration,
) -> TimeSeriesTable {
    let from = centre - before;
    let to = centre + after;
    table.filter_rows(|ts| ts >= from && ts <= to)
}

fn month_start(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

fn next_month_start(start: Date) -> Date {
    let days = time::util::days_in_year_month(start.year(), start.month());
    start + Duration::days(i64::from(days))
}

/// Sums every column per calendar month.
///
/// Output rows are stamped at midnight on the first of the month. Months
/// between the first and last reading that hold no readings appear with a
/// total of 0, and `NaN` readings are skipped.
pub fn monthly_totals(table: &TimeSeriesTable) -> Result<TimeSeriesTable, TableError> {
    let (Some(first), Some(last)) = (table.index().first(), table.index().last()) else {
        let columns = table
            .columns()
            .iter()
            .map(|c| Column::new(c.name.clone(), Vec::new()))
            .collect();
        return TimeSeriesTable::new(Vec::new(), columns);
    };

    let mut months = Vec::new();
    let mut cursor = month_start(first.date());
    let last_month = month_start(last.date());
    while cursor <= last_month {
        months.push(cursor);
        cursor = next_month_start(cursor);
    }

    let mut sums: Vec<Vec<f64>> = vec![vec![0.0; months.len()]; table.columns().len()];
    let mut slot = 0;
    for (row, ts) in table.index().iter().enumerate() {
        let month = month_start(ts.date());
        while months[slot] != month {
            slot += 1;
        }
        for (col, column) in table.columns().iter().enumerate() {
            let v = column.values[row];
            if !v.is_nan() {
                sums[col][slot] += v;
            }
        }
    }

    let index = months
        .into_iter()
        .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
        .collect();
    let columns = table
        .columns()
        .iter()
        .zip(sums)
        .map(|(c, values)| Column::new(c.name.clone(), values))
        .collect();
    TimeSeriesTable::new(index, columns)
}

/// Appends (or replaces) `name` with the row-wise sum of every other column.
pub fn with_total_column(table: &TimeSeriesTable, name: &str) -> Result<TimeSeriesTable, TableError> {
    let mut totals = vec![0.0; table.len()];
    for column in table.columns().iter().filter(|c| c.name != name) {
        for (total, v) in totals.iter_mut().zip(&column.values) {
            if !v.is_nan() {
                *total += v;
            }
        }
    }
    table.with_column(Column::new(name, totals))
}

/// Converts per-interval energy (kWh) in `column` to average power (kW),
/// rounded to one decimal place.
pub fn interval_energy_to_power(
    table: &TimeSeriesTable,
    column: &str,
    step: Duration,
) -> Result<TimeSeriesTable, TableError> {
    let factor = 3600.0 / step.as_seconds_f64();
    let values = table
        .column(column)?
        .iter()
        .map(|v| (v * factor * 10.0).round_ties_even() / 10.0)
        .collect();
    table.with_column(Column::new(column, values))
}
