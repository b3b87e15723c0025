use std::{collections::BTreeMap, fs::File, io::Read, path::PathBuf};

use csv::StringRecord;
use meter_data::domain::{InvoicePeriod, InvoiceTable, ALL_METERS};
use time::{macros::format_description, Date, Duration, PrimitiveDateTime, Time};

use crate::{
    error::AnalyticsError,
    sources::half_hourly_csv_file::{parse_reading, parse_timestamp},
};

/// Suffix shared by every charge column of an electricity invoice.
pub const CHARGE_SUFFIX: &str = "- Charge [GBP]";
/// Charge that the standing and network charges are folded into.
pub const FIXED_CHARGE: &str = "Fixed - Charge [GBP]";

const FIXED_CHARGE_PREFIXES: [&str; 9] = [
    "Site",
    "Availability",
    "Distrib fixed",
    "Data collection",
    "Settlement",
    "Network",
    "Reactive",
    "Reconciliation",
    "Standing",
];

const MPAN_MPR: &str = "MPAN/MPR";
const PERIOD_FROM: &str = "period_from";
const MPR: &str = "mpr";

/// Gas invoice columns and the charge names they are reported under.
const GAS_CHARGES: [(&str, &str); 4] = [
    ("cost_per_meter", "Cost Per Meter [GBP]"),
    ("ccl_total", "Climate Change Levy [GBP]"),
    ("standing_charge", "Standing Charges [GBP]"),
    ("vat_total", "VAT Charge [GBP]"),
];

/// Invoice export layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvoiceKind {
    /// Billing date in the first column, meter in `MPAN/MPR` and one
    /// `<name> - Charge [GBP]` column per charge. Rows are summed per
    /// calendar month.
    #[default]
    Electricity,
    /// Billing date in `period_from`, meter in `mpr` and the cost columns
    /// listed in `GAS_CHARGES`. Rows are summed per billing date.
    Gas,
}

/// Monthly invoice export of per-meter charges.
///
/// Each billing period gains an `All` row summing every meter. Amounts may
/// carry thousands separators; blank cells are skipped when summing.
pub struct InvoiceFileSource {
    path: PathBuf,
    kind: InvoiceKind,
}

impl InvoiceFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, kind: InvoiceKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn load(&self) -> Result<InvoiceTable, AnalyticsError> {
        let file = File::open(&self.path).map_err(|e| {
            AnalyticsError::Source(format!("failed to open invoice file {}: {e}", self.path.display()))
        })?;
        let table = read_invoices(file, self.kind)?;
        tracing::info!(
            path = %self.path.display(),
            kind = ?self.kind,
            periods = table.periods.len(),
            charges = table.charge_names.len(),
            "read invoices"
        );
        Ok(table)
    }
}

/// Where the period, meter and charges live in a header row. Each charge
/// column maps to a slot of `names`; several columns may share a slot.
struct Layout {
    period: usize,
    meter: usize,
    charges: Vec<(usize, usize)>,
    names: Vec<String>,
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize, AnalyticsError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| AnalyticsError::Source(format!("invoice file has no '{name}' column")))
}

fn is_fixed_charge(header: &str) -> bool {
    FIXED_CHARGE_PREFIXES
        .iter()
        .any(|prefix| header == format!("{prefix} {CHARGE_SUFFIX}"))
}

fn electricity_layout(headers: &StringRecord) -> Result<Layout, AnalyticsError> {
    let meter = find_column(headers, MPAN_MPR)?;
    let mut names = Vec::new();
    let mut charges = Vec::new();
    let mut fixed = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let header = header.trim();
        if idx == 0 || idx == meter || !header.contains(CHARGE_SUFFIX) {
            continue;
        }
        if is_fixed_charge(header) {
            fixed.push(idx);
        } else {
            charges.push((idx, names.len()));
            names.push(header.to_string());
        }
    }
    if !fixed.is_empty() {
        let slot = names.len();
        names.push(FIXED_CHARGE.to_string());
        charges.extend(fixed.into_iter().map(|idx| (idx, slot)));
    }

    Ok(Layout {
        period: 0,
        meter,
        charges,
        names,
    })
}

fn gas_layout(headers: &StringRecord) -> Result<Layout, AnalyticsError> {
    let period = find_column(headers, PERIOD_FROM)?;
    let meter = find_column(headers, MPR)?;
    let mut names = Vec::new();
    let mut charges = Vec::new();
    for (column, label) in GAS_CHARGES {
        if let Ok(idx) = find_column(headers, column) {
            charges.push((idx, names.len()));
            names.push(label.to_string());
        }
    }
    Ok(Layout {
        period,
        meter,
        charges,
        names,
    })
}

/// ISO dates and timestamps, or `DD/MM/YYYY`.
fn parse_billing_date(s: &str) -> Result<PrimitiveDateTime, AnalyticsError> {
    parse_timestamp(s).or_else(|_| {
        Date::parse(s.trim(), format_description!("[day]/[month]/[year]"))
            .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
            .map_err(|e| AnalyticsError::Source(format!("invalid billing date '{s}': {e}")))
    })
}

fn month_start(ts: PrimitiveDateTime) -> PrimitiveDateTime {
    let date = ts.date() - Duration::days(i64::from(ts.day()) - 1);
    PrimitiveDateTime::new(date, Time::MIDNIGHT)
}

type Totals = BTreeMap<(PrimitiveDateTime, String), Vec<f64>>;

fn record_into_totals(
    record: &StringRecord,
    layout: &Layout,
    kind: InvoiceKind,
    totals: &mut Totals,
) -> Result<(), AnalyticsError> {
    let billed = parse_billing_date(record.get(layout.period).unwrap_or(""))?;
    let period = match kind {
        InvoiceKind::Electricity => month_start(billed),
        InvoiceKind::Gas => billed,
    };
    let meter = record.get(layout.meter).unwrap_or("").trim();
    if meter.is_empty() {
        return Err(AnalyticsError::Source("invoice row has no meter".to_string()));
    }

    let sums = totals
        .entry((period, meter.to_string()))
        .or_insert_with(|| vec![0.0; layout.names.len()]);
    for &(idx, slot) in &layout.charges {
        let amount = parse_reading(record.get(idx).unwrap_or(""))?;
        if !amount.is_nan() {
            sums[slot] += amount;
        }
    }
    Ok(())
}

/// Reads an invoice export from any reader into per-meter and `All` rows.
pub fn read_invoices<R: Read>(reader: R, kind: InvoiceKind) -> Result<InvoiceTable, AnalyticsError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| AnalyticsError::Source(format!("failed to read invoice headers: {e}")))?
        .clone();
    let layout = match kind {
        InvoiceKind::Electricity => electricity_layout(&headers)?,
        InvoiceKind::Gas => gas_layout(&headers)?,
    };
    if layout.names.is_empty() {
        return Err(AnalyticsError::Source("invoice file has no charge columns".to_string()));
    }

    let mut totals = Totals::new();
    for result in rdr.records() {
        let record = result
            .map_err(|e| AnalyticsError::Source(format!("failed to read invoice record: {e}")))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if let Err(e) = record_into_totals(&record, &layout, kind, &mut totals) {
            metrics::counter!("invoice_parse_errors_total").increment(1);
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(AnalyticsError::Source(format!("line {line}: {e}")));
        }
    }

    let mut periods = Vec::with_capacity(totals.len());
    let mut all: Option<InvoicePeriod> = None;
    for ((period, meter), charges) in totals {
        if all.as_ref().is_some_and(|a| a.period != period) {
            periods.extend(all.take());
        }
        let sums = all.get_or_insert_with(|| InvoicePeriod {
            period,
            meter: ALL_METERS.to_string(),
            charges: vec![0.0; charges.len()],
        });
        for (sum, v) in sums.charges.iter_mut().zip(&charges) {
            *sum += v;
        }
        periods.push(InvoicePeriod {
            period,
            meter,
            charges,
        });
    }
    periods.extend(all);
    metrics::counter!("invoice_periods_total").increment(periods.len() as u64);

    Ok(InvoiceTable {
        charge_names: layout.names,
        periods,
    })
}
