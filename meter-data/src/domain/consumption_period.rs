use time::PrimitiveDateTime;

/// A contiguous out-of-hours run ranked against its expected baseload.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionPeriod {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub total_consumption: f64,
    pub expected_consumption: f64,
    pub percentage_above_baseline: f64,
}
