use meter_data::domain::{CostEntry, InvoiceTable};

use crate::analysis::stats::round_to;

/// How each charge of a bill is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostView {
    /// The charge in GBP.
    #[default]
    Absolute,
    /// The charge as a percentage of that period's whole bill.
    ShareOfBill,
}

/// One entry per charge and billing period of `meter`, oldest period first.
///
/// Amounts are rounded to two decimal places. A bill totalling zero gives
/// every charge a zero share. An unknown meter yields no entries.
pub fn cost_breakdown(invoices: &InvoiceTable, meter: &str, view: CostView) -> Vec<CostEntry> {
    let mut periods: Vec<_> = invoices.for_meter(meter).collect();
    periods.sort_by_key(|p| p.period);
    if periods.is_empty() {
        tracing::warn!(meter, "no invoices for meter");
    }

    periods
        .into_iter()
        .flat_map(|p| {
            let total = p.total();
            invoices
                .charge_names
                .iter()
                .zip(&p.charges)
                .map(move |(charge, amount)| {
                    let value = match view {
                        CostView::Absolute => round_to(*amount, 2),
                        CostView::ShareOfBill if total == 0.0 || !total.is_finite() => 0.0,
                        CostView::ShareOfBill => round_to(amount / total * 100.0, 2),
                    };
                    CostEntry {
                        period: p.period,
                        meter: p.meter.clone(),
                        charge: charge.clone(),
                        value,
                    }
                })
        })
        .collect()
}
