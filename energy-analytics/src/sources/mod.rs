pub mod gas_read_file;
pub mod half_hourly_csv_file;
pub mod invoice_file;

pub use gas_read_file::{read_gas_reads, GasReadFileSource};
pub use half_hourly_csv_file::{read_half_hourly_csv, HalfHourlyCsvFileSource};
pub use invoice_file::{read_invoices, InvoiceFileSource, InvoiceKind};
