/// Quantile with linear interpolation between order statistics, skipping
/// `NaN`. Returns `NaN` when no finite-or-infinite values remain.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Rounds to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenth_percentile_interpolates_linearly() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((quantile(&values, 0.10) - 1.9).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 10.0);
    }

    #[test]
    fn single_value_is_its_own_quantile() {
        assert_eq!(quantile(&[4.2], 0.10), 4.2);
    }

    #[test]
    fn nan_is_ignored_and_empty_is_nan() {
        assert_eq!(median(&[3.0, f64::NAN, 1.0]), 2.0);
        assert!(quantile(&[f64::NAN], 0.5).is_nan());
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1250.4, 0), 1250.0);
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(round_to(10.5, 0), 10.0);
        assert_eq!(round_to(11.5, 0), 12.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(0.125, 2), 0.12);
    }
}
