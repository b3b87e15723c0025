use std::{collections::BTreeMap, fs, path::Path};

use meter_data::domain::{BaselineKind, WorkHours};
use serde::{Deserialize, Deserializer};
use time::{macros::format_description, Duration, Time};

use crate::{analysis::out_of_hours::ExpectedBaseline, error::AnalyticsError};

pub const CONFIG_ENV: &str = "ENERGY_ANALYTICS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "energy-analytics.toml";

fn deserialize_time_of_day<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Time::parse(s.trim(), format_description!("[hour]:[minute]"))
        .map_err(|e| serde::de::Error::custom(format!("invalid time of day '{s}': {e}")))
}

fn default_work_start() -> Time {
    WorkHours::default().start
}

fn default_work_end() -> Time {
    WorkHours::default().end
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub nominal_step_minutes: i64,
    pub top_n: usize,
    pub min_separation_days: i64,
    pub rolling_window_steps: usize,
    pub baseline_quantile: f64,
    pub baseline: BaselineKind,
    pub expected_baseline: ExpectedBaseline,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            nominal_step_minutes: 30,
            top_n: 10,
            min_separation_days: 3,
            rolling_window_steps: 8,
            baseline_quantile: 0.10,
            baseline: BaselineKind::Monthly,
            expected_baseline: ExpectedBaseline::ClosingRow,
        }
    }
}

impl AnalysisConfig {
    pub fn nominal_step(&self) -> Duration {
        Duration::minutes(self.nominal_step_minutes)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeterConfig {
    #[serde(default = "default_work_start", deserialize_with = "deserialize_time_of_day")]
    pub work_start: Time,
    #[serde(default = "default_work_end", deserialize_with = "deserialize_time_of_day")]
    pub work_end: Time,
    pub demand_limit_kw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub meters: BTreeMap<String, MeterConfig>,
}

impl AppConfig {
    /// Reads the TOML file named by `ENERGY_ANALYTICS_CONFIG`, falling back to
    /// defaults when the variable is unset and `energy-analytics.toml` is absent.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let (path, explicit) = match env::var(CONFIG_ENV) {
            Ok(p) => (p, true),
            Err(_) => (DEFAULT_CONFIG_PATH.to_string(), false),
        };

        if !explicit && !Path::new(&path).exists() {
            tracing::info!(path = %path, "no config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let cfg = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path, meters = cfg.meters.len(), "loaded config");
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, AnalyticsError> {
        let cfg: AppConfig =
            toml::from_str(contents).map_err(|e| AnalyticsError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), AnalyticsError> {
        let a = &self.analysis;
        if a.nominal_step_minutes <= 0 {
            return Err(AnalyticsError::Config("nominal_step_minutes must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&a.baseline_quantile) {
            return Err(AnalyticsError::Config("baseline_quantile must lie in [0, 1]".to_string()));
        }
        if a.rolling_window_steps == 0 {
            return Err(AnalyticsError::Config("rolling_window_steps must be at least 1".to_string()));
        }
        if a.min_separation_days < 0 {
            return Err(AnalyticsError::Config("min_separation_days must be non-negative".to_string()));
        }
        Ok(())
    }

    /// Working-hours window of `meter`, 08:00-18:00 when not configured.
    pub fn work_hours(&self, meter: &str) -> WorkHours {
        self.meters
            .get(meter)
            .map(|m| WorkHours::new(m.work_start, m.work_end))
            .unwrap_or_default()
    }

    pub fn demand_limit(&self, meter: &str) -> Option<f64> {
        self.meters.get(meter).and_then(|m| m.demand_limit_kw)
    }

    pub fn demand_limits(&self) -> BTreeMap<String, f64> {
        self.meters
            .iter()
            .filter_map(|(id, m)| m.demand_limit_kw.map(|l| (id.clone(), l)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.analysis.top_n, 10);
        assert_eq!(cfg.analysis.min_separation_days, 3);
        assert_eq!(cfg.analysis.nominal_step(), Duration::minutes(30));
        assert_eq!(cfg.work_hours("anything"), WorkHours::default());
        assert_eq!(cfg.demand_limit("anything"), None);
    }

    #[test]
    fn meter_sections_override_window_and_limit() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [analysis]
            top_n = 5
            baseline = "seasonal"
            expected_baseline = "run_mean"

            [meters."12345"]
            work_start = "07:30"
            work_end = "19:00"
            demand_limit_kw = 135.0

            [meters."98765"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.analysis.top_n, 5);
        assert_eq!(cfg.analysis.baseline, BaselineKind::Seasonal);
        assert_eq!(cfg.analysis.expected_baseline, ExpectedBaseline::RunMean);
        assert_eq!(cfg.work_hours("12345"), WorkHours::new(time!(07:30), time!(19:00)));
        assert_eq!(cfg.work_hours("98765"), WorkHours::default());
        assert_eq!(cfg.demand_limit("12345"), Some(135.0));
        assert_eq!(cfg.demand_limits().len(), 1);
    }

    #[test]
    fn malformed_time_of_day_is_a_config_error() {
        let res = AppConfig::from_toml_str("[meters.a]\nwork_start = \"8am\"\n");
        assert!(matches!(res, Err(AnalyticsError::Config(_))));
    }

    #[test]
    fn quantile_outside_unit_interval_is_rejected() {
        let res = AppConfig::from_toml_str("[analysis]\nbaseline_quantile = 1.5\n");
        assert!(matches!(res, Err(AnalyticsError::Config(_))));
    }
}
