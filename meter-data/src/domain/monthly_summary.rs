use std::fmt;

use crate::domain::EnergyUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatistic {
    Current,
    Previous,
    Median,
    Min,
    Max,
}

impl SummaryStatistic {
    pub const ALL: [SummaryStatistic; 5] = [
        Self::Current,
        Self::Previous,
        Self::Median,
        Self::Min,
        Self::Max,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Current => "Current year",
            Self::Previous => "Previous year",
            Self::Median => "Median",
            Self::Min => "Min",
            Self::Max => "Max",
        }
    }
}

/// A summary table cell; `NoData` when the month has too few years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryCell {
    Value(f64),
    NoData,
}

impl SummaryCell {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NoData => None,
        }
    }
}

impl fmt::Display for SummaryCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::NoData => f.write_str("No data"),
        }
    }
}

/// Statistic × calendar month table, January first.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub unit: EnergyUnit,
    pub cells: [[SummaryCell; 12]; 5],
}

impl MonthlySummary {
    pub fn cell(&self, statistic: SummaryStatistic, month: time::Month) -> SummaryCell {
        self.cells[statistic as usize][u8::from(month) as usize - 1]
    }

    pub fn row(&self, statistic: SummaryStatistic) -> &[SummaryCell; 12] {
        &self.cells[statistic as usize]
    }
}
