use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::Read,
    path::PathBuf,
};

use csv::StringRecord;
use meter_data::domain::{Column, TimeSeriesTable};
use time::{macros::format_description, Date, Duration, PrimitiveDateTime, Time};

use crate::{error::AnalyticsError, pipeline::Source, sources::half_hourly_csv_file::parse_reading};

/// Standard cubic metres of gas to kWh.
pub const SM3_TO_KWH: f64 = 10.795;

const READ_DATE: &str = "ReadDate";
const MPR: &str = "MPR";

/// Daily gas read sheet: one row per meter (`MPR`) and day (`ReadDate`,
/// `DD/MM/YYYY`), then 48 columns whose headers end with the interval end
/// time `HHMM` (`0030` through `2400`).
///
/// Readings are converted to kWh and stamped at the interval start, giving
/// one table column per MPR.
pub struct GasReadFileSource {
    path: PathBuf,
}

impl GasReadFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Source for GasReadFileSource {
    fn load(&self) -> Result<TimeSeriesTable, AnalyticsError> {
        let file = File::open(&self.path).map_err(|e| {
            AnalyticsError::Source(format!("failed to open gas file {}: {e}", self.path.display()))
        })?;
        let table = read_gas_reads(file)?;
        tracing::info!(
            path = %self.path.display(),
            rows = table.len(),
            meters = table.columns().len(),
            "read gas reads"
        );
        Ok(table)
    }
}

/// Minutes after midnight at which the interval ends, from a header such as
/// `HH0030` or `2400`.
fn interval_end_minutes(header: &str) -> Option<i64> {
    let header = header.trim();
    let hhmm = header.get(header.len().checked_sub(4)?..)?;
    if !hhmm.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i64 = hhmm[..2].parse().ok()?;
    let minutes: i64 = hhmm[2..].parse().ok()?;
    let total = hours * 60 + minutes;
    (minutes < 60 && (30..=24 * 60).contains(&total)).then_some(total)
}

fn parse_read_date(s: &str) -> Result<Date, AnalyticsError> {
    Date::parse(s.trim(), format_description!("[day]/[month]/[year]"))
        .map_err(|e| AnalyticsError::Source(format!("invalid ReadDate '{s}': {e}")))
}

type Readings = BTreeMap<String, BTreeMap<PrimitiveDateTime, f64>>;

fn record_into_readings(
    record: &StringRecord,
    headers: &StringRecord,
    intervals: &[(usize, i64)],
    readings: &mut Readings,
) -> Result<(), AnalyticsError> {
    let get = |name: &str| -> Result<&str, AnalyticsError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| AnalyticsError::Source(format!("missing column '{name}' in gas record")))
    };

    let day = PrimitiveDateTime::new(parse_read_date(get(READ_DATE)?)?, Time::MIDNIGHT);
    let mpr = get(MPR)?.trim().to_string();
    let meter = readings.entry(mpr.clone()).or_default();

    for &(idx, end_minutes) in intervals {
        let value = parse_reading(record.get(idx).unwrap_or(""))? * SM3_TO_KWH;
        let ts = day + Duration::minutes(end_minutes - 30);
        if meter.insert(ts, value).is_some() {
            return Err(AnalyticsError::Source(format!(
                "duplicate gas reading for MPR {mpr} at {ts}"
            )));
        }
    }
    Ok(())
}

/// Reads a daily gas read sheet from any reader.
pub fn read_gas_reads<R: Read>(reader: R) -> Result<TimeSeriesTable, AnalyticsError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| AnalyticsError::Source(format!("failed to read gas headers: {e}")))?
        .clone();

    let mut intervals = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let name = header.trim();
        if name == READ_DATE || name == MPR {
            continue;
        }
        match interval_end_minutes(name) {
            Some(end) => intervals.push((idx, end)),
            None => tracing::warn!(column = name, "ignoring non-interval column in gas reads"),
        }
    }

    let mut readings = Readings::new();
    let mut records = 0u64;
    for result in rdr.records() {
        let record = result
            .map_err(|e| AnalyticsError::Source(format!("failed to read gas record: {e}")))?;
        if let Err(e) = record_into_readings(&record, &headers, &intervals, &mut readings) {
            metrics::counter!("gas_reads_parse_errors_total").increment(1);
            return Err(e);
        }
        records += 1;
    }
    metrics::counter!("gas_reads_records_total").increment(records);

    let index: Vec<PrimitiveDateTime> = readings
        .values()
        .flat_map(|meter| meter.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns = readings
        .into_iter()
        .map(|(mpr, meter)| {
            let values = index
                .iter()
                .map(|ts| meter.get(ts).copied().unwrap_or(f64::NAN))
                .collect();
            Column::new(mpr, values)
        })
        .collect();
    Ok(TimeSeriesTable::new(index, columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn interval_headers_map_to_end_minutes() {
        assert_eq!(interval_end_minutes("HH0030"), Some(30));
        assert_eq!(interval_end_minutes("1330"), Some(810));
        assert_eq!(interval_end_minutes("2400"), Some(1440));
        assert_eq!(interval_end_minutes("Total"), None);
        assert_eq!(interval_end_minutes("0000"), None);
        assert_eq!(interval_end_minutes("0075"), None);
    }

    #[test]
    fn readings_are_stamped_at_interval_start_in_kwh() {
        let data = "\
ReadDate,MPR,HH0030,HH2400
01/02/2023,111,1,2
01/02/2023,222,,4
02/02/2023,111,3,5
";
        let table = read_gas_reads(data.as_bytes()).unwrap();
        assert_eq!(
            table.index(),
            &[
                datetime!(2023-02-01 00:00),
                datetime!(2023-02-01 23:30),
                datetime!(2023-02-02 00:00),
                datetime!(2023-02-02 23:30),
            ]
        );
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["111", "222"]);

        let first = table.column("111").unwrap();
        assert_eq!(first[0], SM3_TO_KWH);
        assert_eq!(first[3], 5.0 * SM3_TO_KWH);

        let second = table.column("222").unwrap();
        assert!(second[0].is_nan());
        assert_eq!(second[1], 4.0 * SM3_TO_KWH);
        assert!(second[2].is_nan());
    }

    #[test]
    fn repeated_meter_day_is_rejected() {
        let data = "ReadDate,MPR,0030\n01/02/2023,111,1\n01/02/2023,111,2\n";
        assert!(matches!(read_gas_reads(data.as_bytes()), Err(AnalyticsError::Source(_))));
    }
}
