use meter_data::{
    domain::{BaselineKind, ContextReading, TimeSeriesTable},
    query::window_around,
};
use time::{Date, Duration, PrimitiveDateTime, Time};

use crate::{analysis::baseline::BaselineCalculator, error::AnalyticsError};

pub const CONTEXT_DAYS_BEFORE: i64 = 3;
/// Three and a half days past the end of working hours.
pub const CONTEXT_HOURS_AFTER: i64 = 84;

/// Drill-down view of the readings around a selected date.
#[derive(Debug, Clone, Default)]
pub struct PeakContext {
    pub baselines: BaselineCalculator,
}

impl PeakContext {
    pub fn new(baselines: BaselineCalculator) -> Self {
        Self { baselines }
    }

    /// Readings from three days before `date` until three and a half days
    /// after working hours end on it, both edges included. Every reading
    /// carries the `kind` baseload in force when working hours end on `date`.
    pub fn readings(
        &self,
        table: &TimeSeriesTable,
        column: &str,
        date: Date,
        kind: BaselineKind,
    ) -> Result<Vec<ContextReading>, AnalyticsError> {
        let day_start = PrimitiveDateTime::new(date, Time::MIDNIGHT);
        let end_of_work = PrimitiveDateTime::new(date, self.baselines.work_hours.end);

        let computed = self.baselines.compute(table, column)?;
        let baseline = computed
            .rows
            .iter()
            .rev()
            .find(|r| r.ts <= end_of_work)
            .map(|r| r.baseline(kind))
            .ok_or_else(|| {
                AnalyticsError::Transform(format!(
                    "no '{column}' reading at or before {end_of_work}"
                ))
            })?;

        let before = Duration::days(CONTEXT_DAYS_BEFORE) + (end_of_work - day_start);
        let window = window_around(table, end_of_work, before, Duration::hours(CONTEXT_HOURS_AFTER));
        let values = window.column(column)?;

        tracing::debug!(
            column,
            %date,
            baseline = %kind,
            rows = window.len(),
            "selected context window"
        );

        Ok(window
            .index()
            .iter()
            .zip(values)
            .map(|(ts, v)| ContextReading {
                ts: *ts,
                value: *v,
                is_working_hours: self.baselines.work_hours.contains(*ts),
                baseline,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    /// Twelve days of half-hourly readings: 10 in working hours, 1 otherwise.
    fn twelve_days() -> TimeSeriesTable {
        let readings = (0..12 * 48)
            .map(|i| {
                let ts = datetime!(2023-01-01 00:00) + Duration::minutes(30 * i);
                let v = if (8..18).contains(&ts.hour()) { 10.0 } else { 1.0 };
                (ts, v)
            })
            .collect();
        TimeSeriesTable::from_series("m-1", readings).unwrap()
    }

    #[test]
    fn window_runs_from_three_days_before_to_three_and_a_half_after_work() {
        let context = PeakContext::default()
            .readings(&twelve_days(), "m-1", date!(2023-01-05), BaselineKind::Monthly)
            .unwrap();

        assert_eq!(context.first().unwrap().ts, datetime!(2023-01-02 00:00));
        assert_eq!(context.last().unwrap().ts, datetime!(2023-01-09 06:00));
        assert_eq!(context.len(), (7 * 24 + 6) * 2 + 1);
        assert!(context.iter().all(|r| r.baseline == 1.0));

        let noon = context.iter().find(|r| r.ts == datetime!(2023-01-05 12:00)).unwrap();
        assert!(noon.is_working_hours);
        assert_eq!(noon.value, 10.0);
    }

    #[test]
    fn date_before_the_data_has_no_baseline() {
        assert!(matches!(
            PeakContext::default().readings(&twelve_days(), "m-1", date!(2022-12-25), BaselineKind::Annual),
            Err(AnalyticsError::Transform(_))
        ));
    }

    #[test]
    fn window_is_clipped_to_the_data() {
        let context = PeakContext::default()
            .readings(&twelve_days(), "m-1", date!(2023-01-01), BaselineKind::Seasonal)
            .unwrap();
        assert_eq!(context.first().unwrap().ts, datetime!(2023-01-01 00:00));
        assert_eq!(context.last().unwrap().ts, datetime!(2023-01-05 06:00));
    }
}
