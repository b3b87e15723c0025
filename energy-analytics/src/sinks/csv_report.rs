use std::io::Write;

use crate::{error::AnalyticsError, pipeline::Sink, sinks::rows::ReportRow};

/// Writes records as CSV with a header row taken from the row type.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReportSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn into_inner(self) -> Result<W, AnalyticsError> {
        self.writer
            .into_inner()
            .map_err(|e| AnalyticsError::Sink(format!("failed to flush CSV output: {e}")))
    }
}

impl<W, T> Sink<T> for CsvReportSink<W>
where
    W: Write,
    T: ReportRow,
{
    fn write_records(&mut self, records: &[T]) -> Result<(), AnalyticsError> {
        for record in records {
            self.writer
                .serialize(record.to_row())
                .map_err(|e| AnalyticsError::Sink(format!("failed to write CSV row: {e}")))?;
        }
        self.writer
            .flush()
            .map_err(|e| AnalyticsError::Sink(format!("failed to flush CSV output: {e}")))?;
        metrics::counter!("report_rows_written_total", "format" => "csv").increment(records.len() as u64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_data::domain::{
        ContextReading, CostEntry, EnergyUnit, MonthlySummary, PeakInstant, SummaryCell,
    };
    use crate::sinks::rows::summary_rows;
    use time::macros::datetime;

    fn written<T: ReportRow>(records: &[T]) -> String {
        let mut sink = CsvReportSink::new(Vec::new());
        sink.write_records(records).unwrap();
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn peaks_have_header_formatted_timestamps_and_blank_missing_limit() {
        let out = written(&[PeakInstant {
            ts: datetime!(2023-01-10 17:30),
            value: 120.5,
            rolling_consumption: 800.25,
            percentage_of_limit: None,
        }]);
        assert_eq!(
            out,
            "datetime,value,rolling_consumption,percentage_of_limit\n\
             2023-01-10 17:30:00,120.5,800.25,\n"
        );
    }

    #[test]
    fn context_and_cost_rows_flatten_to_one_line_each() {
        let context = written(&[ContextReading {
            ts: datetime!(2023-01-05 18:00),
            value: 4.5,
            is_working_hours: false,
            baseline: 1.2,
        }]);
        assert_eq!(
            context,
            "datetime,value,working_hours,baseline\n2023-01-05 18:00:00,4.5,false,1.2\n"
        );

        let cost = written(&[CostEntry {
            period: datetime!(2023-01-01 00:00),
            meter: "All".to_string(),
            charge: "Fixed - Charge [GBP]".to_string(),
            value: 17.0,
        }]);
        assert_eq!(
            cost,
            "period,meter,charge,value\n2023-01-01 00:00:00,All,Fixed - Charge [GBP],17.0\n"
        );
    }

    #[test]
    fn summary_cells_print_no_data() {
        let mut cells = [[SummaryCell::NoData; 12]; 5];
        cells[1][0] = SummaryCell::Value(42.0);
        let summary = MonthlySummary {
            unit: EnergyUnit::Kwh,
            cells,
        };
        let out = written(&summary_rows(&summary));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("statistic,unit,january,february"));
        assert!(lines[2].starts_with("Previous year,kWh,42.0,No data"));
    }
}
