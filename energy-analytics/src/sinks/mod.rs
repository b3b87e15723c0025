pub mod csv_report;
pub mod ndjson;
pub mod rows;

pub use csv_report::CsvReportSink;
pub use ndjson::NdjsonSink;
pub use rows::{summary_rows, ReportRow, SummaryRow};
