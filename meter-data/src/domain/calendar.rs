use std::fmt;

use time::{macros::time, Month, PrimitiveDateTime, Time};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Meteorological season of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Autumn];

    pub fn of_month(month: Month) -> Self {
        match month {
            Month::December | Month::January | Month::February => Self::Winter,
            Month::March | Month::April | Month::May => Self::Spring,
            Month::June | Month::July | Month::August => Self::Summer,
            Month::September | Month::October | Month::November => Self::Autumn,
        }
    }

    /// 1-based position, Winter first.
    pub fn ordinal(self) -> u8 {
        self as u8 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
        }
    }
}

/// Granularity at which a baseload is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BaselineKind {
    Annual,
    Seasonal,
    Monthly,
}

impl BaselineKind {
    pub const ALL: [BaselineKind; 3] = [Self::Annual, Self::Seasonal, Self::Monthly];

    pub fn name(self) -> &'static str {
        match self {
            Self::Annual => "Annual",
            Self::Seasonal => "Seasonal",
            Self::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BaselineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "seasonal" => Ok(Self::Seasonal),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown baseline kind '{other}'")),
        }
    }
}

/// Daily working-hours window of a meter, `[start, end)` in local time.
///
/// A window whose end is earlier than its start wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    pub start: Time,
    pub end: Time,
}

impl WorkHours {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: PrimitiveDateTime) -> bool {
        let t = ts.time();
        if self.start <= self.end {
            t >= self.start && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            start: time!(08:00),
            end: time!(18:00),
        }
    }
}

/// Display unit for energy totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyUnit {
    #[default]
    Kwh,
    Mwh,
}

impl EnergyUnit {
    /// Factor applied to kWh readings.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Kwh => 1.0,
            Self::Mwh => 0.001,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kwh => "kWh",
            Self::Mwh => "MWh",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Kwh => "Energy (kWh)",
            Self::Mwh => "Energy (MWh)",
        }
    }
}
