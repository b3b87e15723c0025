use std::io::Write;

use crate::{error::AnalyticsError, pipeline::Sink, sinks::rows::ReportRow};

/// Writes one JSON object per record, newline separated.
pub struct NdjsonSink<W: Write> {
    out: W,
}

impl<W: Write> NdjsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W, T> Sink<T> for NdjsonSink<W>
where
    W: Write,
    T: ReportRow,
{
    fn write_records(&mut self, records: &[T]) -> Result<(), AnalyticsError> {
        let mut buf = Vec::with_capacity(records.len() * 128);
        for record in records {
            serde_json::to_writer(&mut buf, &record.to_row())
                .map_err(|e| AnalyticsError::Sink(format!("failed to encode record: {e}")))?;
            buf.push(b'\n');
        }
        self.out
            .write_all(&buf)
            .and_then(|_| self.out.flush())
            .map_err(|e| AnalyticsError::Sink(format!("failed to write NDJSON output: {e}")))?;
        metrics::counter!("report_rows_written_total", "format" => "ndjson").increment(records.len() as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_data::domain::ConsumptionPeriod;
    use time::macros::datetime;

    #[test]
    fn periods_are_written_one_object_per_line() {
        let period = ConsumptionPeriod {
            start: datetime!(2023-01-01 22:00),
            end: datetime!(2023-01-01 23:30),
            total_consumption: 10.0,
            expected_consumption: 2.0,
            percentage_above_baseline: 417.0,
        };
        let mut sink = NdjsonSink::new(Vec::new());
        sink.write_records(&[period.clone(), period]).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["start"], "2023-01-01 22:00:00");
        assert_eq!(value["end"], "2023-01-01 23:30:00");
        assert_eq!(value["percentage_above_baseline"], 417.0);
    }
}
