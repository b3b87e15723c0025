use std::collections::BTreeMap;

use meter_data::domain::{LoadDurationPoint, PowerProfile, TimeSeriesTable};
use time::Duration;

use crate::{
    analysis::stats::{median, quantile, round_to},
    error::AnalyticsError,
};

fn power_factor(step: Duration) -> f64 {
    3600.0 / step.as_seconds_f64()
}

/// Demand distribution of every column, converting per-step energy to power.
pub fn power_overview(
    table: &TimeSeriesTable,
    limits: &BTreeMap<String, f64>,
    step: Duration,
) -> Vec<PowerProfile> {
    let factor = power_factor(step);
    table
        .columns()
        .iter()
        .map(|column| {
            let power: Vec<f64> = column.values.iter().map(|v| v * factor).collect();
            let peak = power
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .fold(f64::NAN, f64::max);
            PowerProfile {
                column: column.name.clone(),
                minimum: round_to(quantile(&power, 0.01), 0),
                lower_quartile: round_to(quantile(&power, 0.25), 0),
                median: round_to(median(&power), 0),
                upper_quartile: round_to(quantile(&power, 0.75), 0),
                peak: round_to(peak, 0),
                limit: limits.get(&column.name).copied().unwrap_or(0.0),
            }
        })
        .collect()
}

/// Power readings of `column` sorted high to low, each tagged with the
/// share of half-hours at or above it.
pub fn load_duration_curve(
    table: &TimeSeriesTable,
    column: &str,
    step: Duration,
) -> Result<Vec<LoadDurationPoint>, AnalyticsError> {
    let factor = power_factor(step);
    let mut power: Vec<f64> = table
        .column(column)?
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| v * factor)
        .collect();
    power.sort_by(|a, b| b.total_cmp(a));

    let n = power.len() as f64;
    Ok(power
        .into_iter()
        .enumerate()
        .map(|(i, p)| LoadDurationPoint {
            percentage_of_half_hours: round_to((i + 1) as f64 / n * 100.0, 2),
            power: p,
        })
        .collect())
}
