use meter_data::domain::{
    BaselineLevel, ConsumptionPeriod, ContextReading, CostEntry, LoadDurationPoint, MonthlySummary,
    PeakInstant, PowerProfile, SummaryCell, SummaryStatistic,
};
use serde::{Serialize, Serializer};
use time::{macros::format_description, PrimitiveDateTime};

/// A record that can be written as one flat report row.
pub trait ReportRow {
    type Row: Serialize;

    fn to_row(&self) -> Self::Row;
}

fn serialize_ts<S>(ts: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = ts
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

#[derive(Debug, Serialize)]
pub struct PeriodRow {
    #[serde(serialize_with = "serialize_ts")]
    pub start: PrimitiveDateTime,
    #[serde(serialize_with = "serialize_ts")]
    pub end: PrimitiveDateTime,
    pub period_consumption_kwh: f64,
    pub expected_consumption_kwh: f64,
    pub percentage_above_baseline: f64,
}

impl ReportRow for ConsumptionPeriod {
    type Row = PeriodRow;

    fn to_row(&self) -> PeriodRow {
        PeriodRow {
            start: self.start,
            end: self.end,
            period_consumption_kwh: self.total_consumption,
            expected_consumption_kwh: self.expected_consumption,
            percentage_above_baseline: self.percentage_above_baseline,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PeakRow {
    #[serde(serialize_with = "serialize_ts")]
    pub datetime: PrimitiveDateTime,
    pub value: f64,
    pub rolling_consumption: f64,
    pub percentage_of_limit: Option<f64>,
}

impl ReportRow for PeakInstant {
    type Row = PeakRow;

    fn to_row(&self) -> PeakRow {
        PeakRow {
            datetime: self.ts,
            value: self.value,
            rolling_consumption: self.rolling_consumption,
            percentage_of_limit: self.percentage_of_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContextRow {
    #[serde(serialize_with = "serialize_ts")]
    pub datetime: PrimitiveDateTime,
    pub value: f64,
    pub working_hours: bool,
    pub baseline: f64,
}

impl ReportRow for ContextReading {
    type Row = ContextRow;

    fn to_row(&self) -> ContextRow {
        ContextRow {
            datetime: self.ts,
            value: self.value,
            working_hours: self.is_working_hours,
            baseline: self.baseline,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CostRow {
    #[serde(serialize_with = "serialize_ts")]
    pub period: PrimitiveDateTime,
    pub meter: String,
    pub charge: String,
    pub value: f64,
}

impl ReportRow for CostEntry {
    type Row = CostRow;

    fn to_row(&self) -> CostRow {
        CostRow {
            period: self.period,
            meter: self.meter.clone(),
            charge: self.charge.clone(),
            value: self.value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BaselineLevelRow {
    pub baseline: &'static str,
    pub year: i32,
    pub group: Option<&'static str>,
    pub value: f64,
}

impl ReportRow for BaselineLevel {
    type Row = BaselineLevelRow;

    fn to_row(&self) -> BaselineLevelRow {
        BaselineLevelRow {
            baseline: self.kind.name(),
            year: self.year,
            group: self.group_name(),
            value: self.value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PowerProfileRow {
    pub meter: String,
    pub minimum_kw: f64,
    pub lower_quartile_kw: f64,
    pub median_kw: f64,
    pub upper_quartile_kw: f64,
    pub peak_kw: f64,
    pub limit_kw: f64,
}

impl ReportRow for PowerProfile {
    type Row = PowerProfileRow;

    fn to_row(&self) -> PowerProfileRow {
        PowerProfileRow {
            meter: self.column.clone(),
            minimum_kw: self.minimum,
            lower_quartile_kw: self.lower_quartile,
            median_kw: self.median,
            upper_quartile_kw: self.upper_quartile,
            peak_kw: self.peak,
            limit_kw: self.limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoadDurationRow {
    pub percentage_of_half_hours: f64,
    pub power_kw: f64,
}

impl ReportRow for LoadDurationPoint {
    type Row = LoadDurationRow;

    fn to_row(&self) -> LoadDurationRow {
        LoadDurationRow {
            percentage_of_half_hours: self.percentage_of_half_hours,
            power_kw: self.power,
        }
    }
}

/// Summary cell written as a number, or the text `No data`.
#[derive(Debug, Clone, Copy)]
pub struct CellValue(pub SummaryCell);

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            SummaryCell::Value(v) => serializer.serialize_f64(v),
            SummaryCell::NoData => serializer.serialize_str("No data"),
        }
    }
}

/// One statistic of a monthly summary across the calendar months.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub statistic: &'static str,
    pub unit: &'static str,
    pub january: CellValue,
    pub february: CellValue,
    pub march: CellValue,
    pub april: CellValue,
    pub may: CellValue,
    pub june: CellValue,
    pub july: CellValue,
    pub august: CellValue,
    pub september: CellValue,
    pub october: CellValue,
    pub november: CellValue,
    pub december: CellValue,
}

impl ReportRow for SummaryRow {
    type Row = SummaryRow;

    fn to_row(&self) -> SummaryRow {
        self.clone()
    }
}

/// The five statistic rows of `summary`, current year first.
pub fn summary_rows(summary: &MonthlySummary) -> Vec<SummaryRow> {
    SummaryStatistic::ALL
        .iter()
        .map(|&statistic| {
            let c = summary.row(statistic).map(CellValue);
            SummaryRow {
                statistic: statistic.label(),
                unit: summary.unit.symbol(),
                january: c[0],
                february: c[1],
                march: c[2],
                april: c[3],
                may: c[4],
                june: c[5],
                july: c[6],
                august: c[7],
                september: c[8],
                october: c[9],
                november: c[10],
                december: c[11],
            }
        })
        .collect()
}
