use time::PrimitiveDateTime;

/// Meter name of the per-period row that sums every meter.
pub const ALL_METERS: &str = "All";

/// Charges billed to one meter for one billing period, in the order of
/// [`InvoiceTable::charge_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePeriod {
    pub period: PrimitiveDateTime,
    pub meter: String,
    pub charges: Vec<f64>,
}

impl InvoicePeriod {
    /// The whole bill, skipping missing charges.
    pub fn total(&self) -> f64 {
        self.charges.iter().filter(|v| !v.is_nan()).sum()
    }
}

/// Billing periods sharing one set of named charges, ordered by period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceTable {
    pub charge_names: Vec<String>,
    pub periods: Vec<InvoicePeriod>,
}

impl InvoiceTable {
    pub fn for_meter<'a>(&'a self, meter: &'a str) -> impl Iterator<Item = &'a InvoicePeriod> + 'a {
        self.periods.iter().filter(move |p| p.meter == meter)
    }

    /// Periods whose calendar year lies in `first..=last`.
    pub fn select_years(&self, first: i32, last: i32) -> Self {
        Self {
            charge_names: self.charge_names.clone(),
            periods: self
                .periods
                .iter()
                .filter(|p| (first..=last).contains(&p.period.year()))
                .cloned()
                .collect(),
        }
    }
}

/// One charge of one billing period, either in GBP or as a share of the bill.
#[derive(Debug, Clone, PartialEq)]
pub struct CostEntry {
    pub period: PrimitiveDateTime,
    pub meter: String,
    pub charge: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn period(ts: PrimitiveDateTime, meter: &str, charges: Vec<f64>) -> InvoicePeriod {
        InvoicePeriod {
            period: ts,
            meter: meter.to_string(),
            charges,
        }
    }

    #[test]
    fn total_skips_missing_charges() {
        let p = period(datetime!(2023-01-01 00:00), "m-1", vec![10.0, f64::NAN, 2.5]);
        assert_eq!(p.total(), 12.5);
    }

    #[test]
    fn year_selection_keeps_charge_names() {
        let table = InvoiceTable {
            charge_names: vec!["Energy".to_string()],
            periods: vec![
                period(datetime!(2022-12-01 00:00), "m-1", vec![1.0]),
                period(datetime!(2023-01-01 00:00), "m-1", vec![2.0]),
                period(datetime!(2023-01-01 00:00), ALL_METERS, vec![2.0]),
            ],
        };
        let selected = table.select_years(2023, 2023);
        assert_eq!(selected.charge_names, table.charge_names);
        assert_eq!(selected.periods.len(), 2);
        assert_eq!(selected.for_meter(ALL_METERS).count(), 1);
    }
}
