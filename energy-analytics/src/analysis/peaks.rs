use meter_data::domain::{PeakInstant, TimeSeriesTable};

use crate::{analysis::stats::round_to, error::AnalyticsError};

pub const DEFAULT_TOP_PEAKS: usize = 10;
pub const DEFAULT_MIN_SEPARATION_DAYS: i64 = 3;
/// Eight half-hours, i.e. a four hour look-back.
pub const DEFAULT_WINDOW_STEPS: usize = 8;

/// Metric that peaks are ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakMode {
    /// Backward rolling sum of energy over the window.
    #[default]
    Consumption,
    /// The reading itself, typically power in kW.
    Demand,
}

#[derive(Debug, Clone)]
pub struct PeakWindowDetector {
    pub mode: PeakMode,
    pub window_steps: usize,
    pub top_n: usize,
    pub min_separation_days: i64,
}

impl Default for PeakWindowDetector {
    fn default() -> Self {
        Self {
            mode: PeakMode::Consumption,
            window_steps: DEFAULT_WINDOW_STEPS,
            top_n: DEFAULT_TOP_PEAKS,
            min_separation_days: DEFAULT_MIN_SEPARATION_DAYS,
        }
    }
}

impl PeakWindowDetector {
    pub fn new(mode: PeakMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Greedy selection of the highest instants, skipping any candidate whose
    /// calendar day is within `min_separation_days` of one already chosen.
    pub fn find_top_instants(
        &self,
        table: &TimeSeriesTable,
        column: &str,
        limit: Option<f64>,
    ) -> Result<Vec<PeakInstant>, AnalyticsError> {
        let values = table.column(column)?;
        let index = table.index();
        let rolling = rolling_sum(values, self.window_steps);

        let metric = |i: usize| match self.mode {
            PeakMode::Consumption => rolling[i],
            PeakMode::Demand => values[i],
        };

        let mut candidates: Vec<usize> = (0..values.len()).filter(|&i| !metric(i).is_nan()).collect();
        candidates.sort_by(|&a, &b| metric(b).total_cmp(&metric(a)));

        let mut selected: Vec<usize> = Vec::with_capacity(self.top_n);
        for i in candidates {
            if selected.len() >= self.top_n {
                break;
            }
            let day = index[i].date();
            let too_close = selected
                .iter()
                .any(|&s| (index[s].date() - day).whole_days().abs() <= self.min_separation_days);
            if !too_close {
                selected.push(i);
            }
        }

        tracing::debug!(
            column,
            mode = ?self.mode,
            selected = selected.len(),
            "selected peak instants"
        );

        Ok(selected
            .into_iter()
            .map(|i| PeakInstant {
                ts: index[i],
                value: zero_if_nan(values[i]),
                rolling_consumption: rolling[i],
                percentage_of_limit: percentage_of_limit(values[i], limit),
            })
            .collect())
    }
}

/// Backward sum over up to `window` readings ending at each row, treating
/// missing readings as zero. Rounded to two decimal places.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut acc = 0.0;
    for (i, v) in values.iter().enumerate() {
        acc += zero_if_nan(*v);
        if i >= window {
            acc -= zero_if_nan(values[i - window]);
        }
        out.push(round_to(acc, 2));
    }
    out
}

fn zero_if_nan(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// `value` as a whole percentage of `limit`; `None` when no usable limit is
/// configured.
pub fn percentage_of_limit(value: f64, limit: Option<f64>) -> Option<f64> {
    limit
        .filter(|l| *l != 0.0 && l.is_finite())
        .map(|l| round_to(value / l * 100.0, 0))
}

pub fn find_top_demand_instants(
    table: &TimeSeriesTable,
    column: &str,
    mode: PeakMode,
    limit: Option<f64>,
    top_n: usize,
    min_separation_days: i64,
) -> Result<Vec<PeakInstant>, AnalyticsError> {
    let detector = PeakWindowDetector {
        mode,
        top_n,
        min_separation_days,
        ..PeakWindowDetector::default()
    };
    detector.find_top_instants(table, column, limit)
}
