use meter_data::domain::{gap_hours, BaselineKind, ConsumptionPeriod, TimeSeriesTable, HALF_HOUR};
use serde::Deserialize;
use time::{Duration, PrimitiveDateTime};

use crate::{
    analysis::{
        baseline::{BaselineCalculator, BaselineRow},
        stats::round_to,
    },
    error::AnalyticsError,
};

pub const DEFAULT_TOP_PERIODS: usize = 10;

/// Which reading's baseload prices the expected consumption of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedBaseline {
    /// Baseload of the reading that closes the run (the dashboard's figures).
    #[default]
    ClosingRow,
    /// Baseload of the run's first reading.
    RunFirst,
    /// Mean baseload over the run's readings.
    RunMean,
}

/// Splits out-of-hours readings into contiguous runs and ranks them by
/// consumption relative to the expected baseload.
///
/// A reading joins the current run when it follows the previous out-of-hours
/// reading by exactly one nominal step. Any other gap closes the run, and the
/// closing reading starts the next one. The first out-of-hours reading never
/// joins a run and the final run is never closed, so neither is reported.
#[derive(Debug, Clone)]
pub struct OutOfHoursSegmenter {
    pub baselines: BaselineCalculator,
    pub step: Duration,
    pub top_n: usize,
    pub expected_baseline: ExpectedBaseline,
}

impl Default for OutOfHoursSegmenter {
    fn default() -> Self {
        Self {
            baselines: BaselineCalculator::default(),
            step: HALF_HOUR,
            top_n: DEFAULT_TOP_PERIODS,
            expected_baseline: ExpectedBaseline::ClosingRow,
        }
    }
}

impl OutOfHoursSegmenter {
    pub fn find_top_periods(
        &self,
        table: &TimeSeriesTable,
        column: &str,
        kind: BaselineKind,
    ) -> Result<Vec<ConsumptionPeriod>, AnalyticsError> {
        let baselines = self.baselines.compute(table, column)?;

        let mut periods = Vec::new();
        let mut run: Vec<&BaselineRow> = Vec::new();
        let mut prev_ts = None;
        for row in baselines.out_of_hours() {
            if let Some(prev) = prev_ts {
                if row.ts - prev == self.step {
                    run.push(row);
                } else {
                    periods.extend(self.close_run(&run, prev, row, kind));
                    run.clear();
                    run.push(row);
                }
            }
            prev_ts = Some(row.ts);
        }

        let found = periods.len();
        periods.sort_by(|a, b| b.percentage_above_baseline.total_cmp(&a.percentage_above_baseline));
        periods.truncate(self.top_n);

        tracing::debug!(
            column,
            baseline = %kind,
            periods = found,
            kept = periods.len(),
            "ranked out-of-hours periods"
        );
        Ok(periods)
    }

    fn close_run(
        &self,
        run: &[&BaselineRow],
        previous: PrimitiveDateTime,
        closing: &BaselineRow,
        kind: BaselineKind,
    ) -> Option<ConsumptionPeriod> {
        let first = run.first()?;
        let gap = closing.ts - previous;
        let hours = gap_hours(previous, closing.ts);

        let mut total: f64 = run.iter().map(|r| r.value).filter(|v| !v.is_nan()).sum();
        if total == 0.0 {
            total = 1.0;
        }

        let baseline = match self.expected_baseline {
            ExpectedBaseline::ClosingRow => closing.baseline(kind),
            ExpectedBaseline::RunFirst => first.baseline(kind),
            ExpectedBaseline::RunMean => {
                run.iter().map(|r| r.baseline(kind)).sum::<f64>() / run.len() as f64
            }
        };

        let percentage_above_baseline = if baseline == 0.0 || !baseline.is_finite() {
            0.0
        } else {
            round_to(total / (baseline * hours) * 100.0, 0)
        };

        Some(ConsumptionPeriod {
            start: first.ts,
            end: first.ts + gap,
            total_consumption: round_to(total, 2),
            expected_consumption: round_to(baseline * hours, 0),
            percentage_above_baseline,
        })
    }
}

/// Top `top_n` out-of-hours periods with the default segmenter settings.
pub fn find_top_periods(
    table: &TimeSeriesTable,
    column: &str,
    kind: BaselineKind,
    top_n: usize,
) -> Result<Vec<ConsumptionPeriod>, AnalyticsError> {
    let segmenter = OutOfHoursSegmenter {
        top_n,
        ..OutOfHoursSegmenter::default()
    };
    segmenter.find_top_periods(table, column, kind)
}
