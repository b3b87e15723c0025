use std::collections::BTreeSet;

use meter_data::domain::{EnergyUnit, MonthlySummary, SummaryCell, SummaryStatistic, TimeSeriesTable};

use crate::{
    analysis::stats::{median, round_to},
    error::AnalyticsError,
};

/// Builds the current/previous/median/min/max table per calendar month from
/// a monthly-resampled table (one row per month).
pub fn monthly_summary(
    monthly: &TimeSeriesTable,
    column: &str,
    unit: EnergyUnit,
) -> Result<MonthlySummary, AnalyticsError> {
    let values = monthly.column(column)?;
    let years: BTreeSet<i32> = monthly.index().iter().map(|ts| ts.year()).collect();
    let multiplier = unit.multiplier();

    let mut cells = [[SummaryCell::NoData; 12]; 5];
    for month in 1..=12u8 {
        let month_values: Vec<f64> = monthly
            .index()
            .iter()
            .zip(values)
            .filter(|(ts, v)| u8::from(ts.month()) == month && !v.is_nan())
            .map(|(_, v)| v * multiplier)
            .collect();

        let stats = month_statistics(&month_values, years.len());
        for (statistic, cell) in SummaryStatistic::ALL.iter().zip(stats) {
            cells[*statistic as usize][month as usize - 1] = cell;
        }
    }

    tracing::debug!(column, years = years.len(), unit = unit.label(), "built monthly summary");
    Ok(MonthlySummary { unit, cells })
}

/// Statistics in `SummaryStatistic::ALL` order for one month's values,
/// oldest first.
fn month_statistics(values: &[f64], years: usize) -> [SummaryCell; 5] {
    let Some(&latest) = values.last() else {
        return [SummaryCell::NoData; 5];
    };
    let cell = |v: f64| SummaryCell::Value(round_to(v, 2));

    let (current, previous) = if values.len() < years || values.len() < 2 {
        (SummaryCell::NoData, cell(latest))
    } else {
        (cell(latest), cell(values[values.len() - 2]))
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    [current, previous, cell(median(values)), cell(min), cell(max)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_data::query::monthly_totals;
    use time::{macros::datetime, Month, PrimitiveDateTime};

    fn monthly(readings: Vec<(PrimitiveDateTime, f64)>) -> TimeSeriesTable {
        TimeSeriesTable::from_series("All", readings).unwrap()
    }

    fn month_starts(first_year: i32, years: i32) -> Vec<PrimitiveDateTime> {
        let mut out = Vec::new();
        for year in first_year..first_year + years {
            for month in 1..=12u8 {
                let date = time::Date::from_calendar_date(year, Month::try_from(month).unwrap(), 1).unwrap();
                out.push(PrimitiveDateTime::new(date, time::Time::MIDNIGHT));
            }
        }
        out
    }

    #[test]
    fn identical_years_collapse_to_the_repeated_value() {
        let readings = month_starts(2021, 3).into_iter().map(|ts| (ts, 5.0)).collect();
        let summary = monthly_summary(&monthly(readings), "All", EnergyUnit::Kwh).unwrap();
        for statistic in SummaryStatistic::ALL {
            assert!(summary.row(statistic).iter().all(|c| *c == SummaryCell::Value(5.0)));
        }
    }

    #[test]
    fn current_and_previous_follow_the_latest_years() {
        let readings = month_starts(2021, 3)
            .into_iter()
            .map(|ts| (ts, f64::from(ts.year() - 2020) * 10.0))
            .collect();
        let summary = monthly_summary(&monthly(readings), "All", EnergyUnit::Kwh).unwrap();
        assert_eq!(summary.cell(SummaryStatistic::Current, Month::March), SummaryCell::Value(30.0));
        assert_eq!(summary.cell(SummaryStatistic::Previous, Month::March), SummaryCell::Value(20.0));
        assert_eq!(summary.cell(SummaryStatistic::Median, Month::March), SummaryCell::Value(20.0));
        assert_eq!(summary.cell(SummaryStatistic::Min, Month::March), SummaryCell::Value(10.0));
        assert_eq!(summary.cell(SummaryStatistic::Max, Month::March), SummaryCell::Value(30.0));
    }

    #[test]
    fn months_missing_a_year_have_no_current_value() {
        let summary = monthly_summary(
            &monthly(vec![
                (datetime!(2022-09-01 00:00), 100.0),
                (datetime!(2023-01-01 00:00), 40.0),
            ]),
            "All",
            EnergyUnit::Kwh,
        )
        .unwrap();

        assert_eq!(summary.cell(SummaryStatistic::Current, Month::January), SummaryCell::NoData);
        assert_eq!(summary.cell(SummaryStatistic::Previous, Month::January), SummaryCell::Value(40.0));
        assert_eq!(summary.cell(SummaryStatistic::Median, Month::September), SummaryCell::Value(100.0));
        assert!(summary.row(SummaryStatistic::Max)[1..8].iter().all(|c| *c == SummaryCell::NoData));
    }

    #[test]
    fn single_year_never_reports_a_current_value() {
        let summary = monthly_summary(
            &monthly(vec![(datetime!(2023-05-01 00:00), 7.0)]),
            "All",
            EnergyUnit::Kwh,
        )
        .unwrap();
        assert_eq!(summary.cell(SummaryStatistic::Current, Month::May), SummaryCell::NoData);
        assert_eq!(summary.cell(SummaryStatistic::Previous, Month::May), SummaryCell::Value(7.0));
    }

    #[test]
    fn mwh_unit_scales_before_rounding() {
        let half_hourly = TimeSeriesTable::from_series(
            "All",
            vec![
                (datetime!(2023-02-01 00:00), 1000.0),
                (datetime!(2023-02-14 12:30), 234.5678),
            ],
        )
        .unwrap();
        let summary =
            monthly_summary(&monthly_totals(&half_hourly).unwrap(), "All", EnergyUnit::Mwh).unwrap();
        assert_eq!(summary.cell(SummaryStatistic::Max, Month::February).value(), Some(1.23));
        assert_eq!(summary.unit, EnergyUnit::Mwh);
    }
}
