pub mod baseline_level;
pub mod calendar;
pub mod consumption_period;
pub mod context_reading;
pub mod invoice;
pub mod monthly_summary;
pub mod peak_instant;
pub mod power_profile;
pub mod time_series;

pub use baseline_level::BaselineLevel;
pub use calendar::{BaselineKind, EnergyUnit, Season, WorkHours, MONTH_NAMES};
pub use consumption_period::ConsumptionPeriod;
pub use context_reading::ContextReading;
pub use invoice::{CostEntry, InvoicePeriod, InvoiceTable, ALL_METERS};
pub use monthly_summary::{MonthlySummary, SummaryCell, SummaryStatistic};
pub use peak_instant::PeakInstant;
pub use power_profile::{LoadDurationPoint, PowerProfile};
pub use time_series::{gap_hours, Column, TimeSeriesTable, HALF_HOUR};
