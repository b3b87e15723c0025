use std::collections::BTreeMap;

use meter_data::domain::{BaselineKind, BaselineLevel, Column, Season, TimeSeriesTable, WorkHours};
use time::{Month, PrimitiveDateTime};

use crate::{analysis::stats::quantile, error::AnalyticsError};

pub const DEFAULT_BASELINE_QUANTILE: f64 = 0.10;

/// One reading annotated with its calendar groups and baseloads.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRow {
    pub ts: PrimitiveDateTime,
    pub value: f64,
    pub year: i32,
    pub month: Month,
    pub season: Season,
    pub is_working_hours: bool,
    pub annual: f64,
    pub seasonal: f64,
    pub monthly: f64,
}

impl BaselineRow {
    pub fn baseline(&self, kind: BaselineKind) -> f64 {
        match kind {
            BaselineKind::Annual => self.annual,
            BaselineKind::Seasonal => self.seasonal,
            BaselineKind::Monthly => self.monthly,
        }
    }
}

/// Baseload-annotated copy of a single table column.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineTable {
    pub column: String,
    pub rows: Vec<BaselineRow>,
}

impl BaselineTable {
    pub fn out_of_hours(&self) -> impl Iterator<Item = &BaselineRow> {
        self.rows.iter().filter(|r| !r.is_working_hours)
    }

    /// New table with `Annual`, `Seasonal` and `Monthly` columns appended.
    /// `table` must be the table the baselines were computed from.
    pub fn augment(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
        let same_index = table.len() == self.rows.len()
            && table.index().iter().zip(&self.rows).all(|(ts, r)| *ts == r.ts);
        if !same_index {
            return Err(AnalyticsError::Transform(format!(
                "baselines for '{}' were computed from a different table",
                self.column
            )));
        }

        let mut out = table.clone();
        for kind in BaselineKind::ALL {
            let values = self.rows.iter().map(|r| r.baseline(kind)).collect();
            out = out.with_column(Column::new(kind.name(), values))?;
        }
        Ok(out)
    }

    /// One level per group, ordered by group then year.
    pub fn levels(&self, kind: BaselineKind) -> Vec<BaselineLevel> {
        let mut groups: BTreeMap<(Option<u8>, i32), f64> = BTreeMap::new();
        for row in &self.rows {
            let group = match kind {
                BaselineKind::Annual => None,
                BaselineKind::Seasonal => Some(row.season.ordinal()),
                BaselineKind::Monthly => Some(u8::from(row.month)),
            };
            groups.entry((group, row.year)).or_insert_with(|| row.baseline(kind));
        }

        groups
            .into_iter()
            .map(|((group, year), value)| BaselineLevel {
                kind,
                year,
                group,
                value,
            })
            .collect()
    }
}

/// Computes low-percentile baseloads per year, season and month.
#[derive(Debug, Clone)]
pub struct BaselineCalculator {
    pub quantile: f64,
    pub work_hours: WorkHours,
}

impl Default for BaselineCalculator {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_BASELINE_QUANTILE,
            work_hours: WorkHours::default(),
        }
    }
}

impl BaselineCalculator {
    pub fn new(quantile: f64, work_hours: WorkHours) -> Self {
        Self { quantile, work_hours }
    }

    pub fn compute(
        &self,
        table: &TimeSeriesTable,
        column: &str,
    ) -> Result<BaselineTable, AnalyticsError> {
        let values = table.column(column)?;

        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        let mut by_season: BTreeMap<(i32, Season), Vec<f64>> = BTreeMap::new();
        let mut by_month: BTreeMap<(i32, u8), Vec<f64>> = BTreeMap::new();
        for (ts, v) in table.index().iter().zip(values) {
            let (year, month) = (ts.year(), ts.month());
            by_year.entry(year).or_default().push(*v);
            by_season.entry((year, Season::of_month(month))).or_default().push(*v);
            by_month.entry((year, u8::from(month))).or_default().push(*v);
        }

        let q = self.quantile;
        let annual: BTreeMap<_, f64> = by_year.into_iter().map(|(k, v)| (k, quantile(&v, q))).collect();
        let seasonal: BTreeMap<_, f64> = by_season.into_iter().map(|(k, v)| (k, quantile(&v, q))).collect();
        let monthly: BTreeMap<_, f64> = by_month.into_iter().map(|(k, v)| (k, quantile(&v, q))).collect();

        let rows = table
            .index()
            .iter()
            .zip(values)
            .map(|(ts, v)| {
                let (year, month) = (ts.year(), ts.month());
                let season = Season::of_month(month);
                BaselineRow {
                    ts: *ts,
                    value: *v,
                    year,
                    month,
                    season,
                    is_working_hours: self.work_hours.contains(*ts),
                    annual: annual[&year],
                    seasonal: seasonal[&(year, season)],
                    monthly: monthly[&(year, u8::from(month))],
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            column,
            rows = rows.len(),
            years = annual.len(),
            "computed baselines"
        );

        Ok(BaselineTable {
            column: column.to_string(),
            rows,
        })
    }
}

/// Baselines with the default 10th percentile and 08:00-18:00 working hours.
pub fn compute_baselines(table: &TimeSeriesTable, column: &str) -> Result<BaselineTable, AnalyticsError> {
    BaselineCalculator::default().compute(table, column)
}
