//! Command-line definitions shared by the binaries.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use meter_data::domain::{BaselineKind, TimeSeriesTable, ALL_METERS};
use time::{macros::format_description, Date};

use crate::{
    analysis::CostView,
    error::AnalyticsError,
    pipeline::{Sink, Source},
    sinks::{CsvReportSink, NdjsonSink, ReportRow},
    sources::{GasReadFileSource, HalfHourlyCsvFileSource, InvoiceKind},
    transform::YearRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Ndjson,
}

/// Input file shape.
pub enum FileSource {
    Electricity(HalfHourlyCsvFileSource),
    Gas(GasReadFileSource),
}

impl Source for FileSource {
    fn load(&self) -> Result<TimeSeriesTable, AnalyticsError> {
        match self {
            Self::Electricity(s) => s.load(),
            Self::Gas(s) => s.load(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "energy-analytics")]
#[command(author, version, about = "Baseload, out-of-hours and peak reports from meter exports")]
pub struct Cli {
    #[command(subcommand)]
    pub report: Report,
}

#[derive(Subcommand, Debug)]
pub enum Report {
    /// Annual, seasonal and monthly baseload levels of a meter
    Baselines(MeterArgs),

    /// Out-of-hours periods ranked by consumption above the baseload
    OutOfHours(BaselineArgs),

    /// Highest rolling consumption windows of a meter
    Peaks(MeterArgs),

    /// Highest power demand of a meter against its configured limit
    Demand(MeterArgs),

    /// Power distribution of every meter
    PowerOverview(FileArgs),

    /// Load-duration curve of a meter
    LoadDuration(MeterArgs),

    /// Readings around a selected date next to the baseload line
    #[command(long_about = "Readings from three days before DATE until three and a half days \
        after working hours end on it.\n\
        \nEvery row carries the baseload in force when working hours end on DATE.\n\
        \nExample:\n  \
        energy-analytics peak-context hh.csv 12345 2023-01-10 --baseline seasonal")]
    PeakContext(ContextArgs),

    /// Invoice charges per billing period
    Costs(CostArgs),
}

/// Flags shared by every report.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Read a daily gas read sheet (or gas invoice) instead of electricity")]
    pub gas: bool,

    #[arg(long, help = "Write newline-delimited JSON instead of CSV")]
    pub ndjson: bool,

    #[arg(
        long,
        value_name = "FIRST-LAST",
        value_parser = parse_years,
        help = "Keep only these calendar years, e.g. 2023 or 2021-2023"
    )]
    pub years: Option<YearRange>,
}

impl CommonArgs {
    pub fn format(&self) -> OutputFormat {
        if self.ndjson {
            OutputFormat::Ndjson
        } else {
            OutputFormat::Csv
        }
    }

    pub fn source(&self, path: impl Into<PathBuf>) -> FileSource {
        if self.gas {
            FileSource::Gas(GasReadFileSource::new(path))
        } else {
            FileSource::Electricity(HalfHourlyCsvFileSource::new(path))
        }
    }

    pub fn invoice_kind(&self) -> InvoiceKind {
        if self.gas {
            InvoiceKind::Gas
        } else {
            InvoiceKind::Electricity
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Meter export to read
    pub path: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct MeterArgs {
    /// Meter export to read
    pub path: PathBuf,

    /// Meter column, or `All` for the site total
    pub column: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BaselineArgs {
    #[command(flatten)]
    pub meter: MeterArgs,

    #[arg(
        long,
        value_parser = parse_baseline,
        help = "Baseload to compare against (annual, seasonal, monthly); defaults to the config"
    )]
    pub baseline: Option<BaselineKind>,
}

#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Meter export to read
    pub path: PathBuf,

    /// Meter column, or `All` for the site total
    pub column: String,

    /// Selected date, YYYY-MM-DD
    #[arg(value_parser = parse_date)]
    pub date: Date,

    #[arg(
        long,
        value_parser = parse_baseline,
        help = "Baseload to draw (annual, seasonal, monthly); defaults to the config"
    )]
    pub baseline: Option<BaselineKind>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CostArgs {
    /// Invoice export to read
    pub path: PathBuf,

    #[arg(long, default_value = ALL_METERS, help = "Meter whose bills are broken down")]
    pub meter: String,

    #[arg(long, help = "Report each charge as a percentage of the whole bill")]
    pub share: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CostArgs {
    pub fn view(&self) -> CostView {
        if self.share {
            CostView::ShareOfBill
        } else {
            CostView::Absolute
        }
    }
}

/// Arguments of the `monthly_summary` binary.
#[derive(Parser, Debug)]
#[command(name = "monthly_summary")]
#[command(author, version, about = "Month-by-month consumption summary of a meter")]
pub struct SummaryCli {
    #[command(flatten)]
    pub meter: MeterArgs,

    #[arg(long, help = "Report totals in MWh instead of kWh")]
    pub mwh: bool,
}

/// `2023` or `2021-2023`.
fn parse_years(s: &str) -> Result<YearRange, String> {
    let (first, last) = s.split_once('-').unwrap_or((s, s));
    let year = |y: &str| y.trim().parse::<i32>().map_err(|e| format!("invalid year in '{s}': {e}"));
    let (first, last) = (year(first)?, year(last)?);
    if first > last {
        return Err(format!("year range '{s}' is empty"));
    }
    Ok(YearRange { first, last })
}

fn parse_baseline(s: &str) -> Result<BaselineKind, String> {
    s.parse()
}

fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("invalid date '{s}': {e}"))
}

/// Writes `records` to stdout in the requested format.
pub fn emit<T: ReportRow>(records: &[T], format: OutputFormat) -> Result<(), AnalyticsError> {
    let stdout = io::stdout().lock();
    match format {
        OutputFormat::Csv => {
            let mut sink = CsvReportSink::new(stdout);
            sink.write_records(records)?;
            sink.into_inner()?
                .flush()
                .map_err(|e| AnalyticsError::Sink(e.to_string()))
        }
        OutputFormat::Ndjson => NdjsonSink::new(stdout).write_records(records),
    }
}
