use time::PrimitiveDateTime;

/// A reading in the window shown around a selected date, next to the
/// baseload level it is compared against.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextReading {
    pub ts: PrimitiveDateTime,
    pub value: f64,
    pub is_working_hours: bool,
    /// Baseload at the end of working hours on the selected date.
    pub baseline: f64,
}
