use time::PrimitiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PeakInstant {
    pub ts: PrimitiveDateTime,
    pub value: f64,
    /// Backward rolling-window sum ending at `ts`.
    pub rolling_consumption: f64,
    /// `None` when the meter has no configured limit.
    pub percentage_of_limit: Option<f64>,
}
