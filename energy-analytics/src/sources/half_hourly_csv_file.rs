use std::{fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use meter_data::domain::{Column, TimeSeriesTable};
use time::{macros::format_description, Date, PrimitiveDateTime, Time};

use crate::{error::AnalyticsError, pipeline::Source};

/// Wide half-hourly CSV source.
///
/// The first column holds the timestamp (`YYYY-MM-DD HH:MM[:SS]`, a `T`
/// separator, or a bare date for monthly files) and every other column is
/// one meter. Readings may carry thousands separators; blank cells load as
/// `NaN`. Rows are sorted by timestamp.
pub struct HalfHourlyCsvFileSource {
    path: PathBuf,
}

impl HalfHourlyCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Source for HalfHourlyCsvFileSource {
    fn load(&self) -> Result<TimeSeriesTable, AnalyticsError> {
        let file = File::open(&self.path).map_err(|e| {
            AnalyticsError::Source(format!("failed to open CSV file {}: {e}", self.path.display()))
        })?;
        let table = read_half_hourly_csv(file)?;
        tracing::info!(path = %self.path.display(), rows = table.len(), "read half-hourly CSV");
        Ok(table)
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Result<PrimitiveDateTime, AnalyticsError> {
    let s = s.trim();
    let datetime_formats = [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    for format in datetime_formats {
        if let Ok(ts) = PrimitiveDateTime::parse(s, format) {
            return Ok(ts);
        }
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
        .map_err(|e| AnalyticsError::Source(format!("invalid timestamp '{s}': {e}")))
}

/// Blank cells are missing readings; anything else must be a number once
/// thousands separators are removed.
pub(crate) fn parse_reading(s: &str) -> Result<f64, AnalyticsError> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(f64::NAN);
    }
    cleaned
        .parse()
        .map_err(|e| AnalyticsError::Source(format!("invalid reading '{s}': {e}")))
}

fn record_to_row(record: &StringRecord, width: usize) -> Result<(PrimitiveDateTime, Vec<f64>), AnalyticsError> {
    let ts_str = record
        .get(0)
        .ok_or_else(|| AnalyticsError::Source("empty CSV record".to_string()))?;
    let ts = parse_timestamp(ts_str)?;

    let values = (1..width)
        .map(|idx| parse_reading(record.get(idx).unwrap_or("")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((ts, values))
}

/// Reads a wide half-hourly CSV from any reader.
pub fn read_half_hourly_csv<R: Read>(reader: R) -> Result<TimeSeriesTable, AnalyticsError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| AnalyticsError::Source(format!("failed to read CSV headers: {e}")))?
        .clone();
    if headers.len() < 2 {
        return Err(AnalyticsError::Source(
            "CSV needs a timestamp column and at least one meter column".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result
            .map_err(|e| AnalyticsError::Source(format!("failed to read CSV record: {e}")))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let row = match record_to_row(&record, headers.len()) {
            Ok(r) => r,
            Err(e) => {
                metrics::counter!("half_hourly_csv_parse_errors_total").increment(1);
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(AnalyticsError::Source(format!("line {line}: {e}")));
            }
        };
        rows.push(row);
    }
    metrics::counter!("half_hourly_csv_rows_total").increment(rows.len() as u64);

    rows.sort_by_key(|(ts, _)| *ts);
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); headers.len() - 1];
    let mut index = Vec::with_capacity(rows.len());
    for (ts, values) in rows {
        index.push(ts);
        for (column, v) in columns.iter_mut().zip(values) {
            column.push(v);
        }
    }

    let columns = headers
        .iter()
        .skip(1)
        .zip(columns)
        .map(|(name, values)| Column::new(name.trim(), values))
        .collect();
    Ok(TimeSeriesTable::new(index, columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_data::TableError;
    use time::macros::datetime;

    #[test]
    fn reads_wide_csv_with_thousands_separators_and_blanks() {
        let data = "\
Datetime,12345,98765
2023-01-01 00:30:00,\"1,234.5\",2
2023-01-01 00:00:00,10,
";
        let table = read_half_hourly_csv(data.as_bytes()).unwrap();
        assert_eq!(
            table.index(),
            &[datetime!(2023-01-01 00:00), datetime!(2023-01-01 00:30)]
        );
        assert_eq!(table.column("12345").unwrap(), &[10.0, 1234.5]);
        let other = table.column("98765").unwrap();
        assert!(other[0].is_nan());
        assert_eq!(other[1], 2.0);
    }

    #[test]
    fn accepts_iso_and_date_only_timestamps() {
        assert_eq!(parse_timestamp("2023-03-04T05:30").unwrap(), datetime!(2023-03-04 05:30));
        assert_eq!(parse_timestamp("2023-03-01").unwrap(), datetime!(2023-03-01 00:00));
        assert!(parse_timestamp("04/03/2023").is_err());
    }

    #[test]
    fn duplicate_timestamps_are_invalid_input() {
        let data = "ts,m\n2023-01-01 00:00,1\n2023-01-01 00:00,2\n";
        assert!(matches!(
            read_half_hourly_csv(data.as_bytes()),
            Err(AnalyticsError::InvalidInput(TableError::UnorderedIndex { .. }))
        ));
    }

    #[test]
    fn bad_reading_reports_its_line() {
        let data = "ts,m\n2023-01-01 00:00,1\n2023-01-01 00:30,abc\n";
        let err = read_half_hourly_csv(data.as_bytes()).unwrap_err().to_string();
        assert!(err.contains("line 3"), "{err}");
    }
}
