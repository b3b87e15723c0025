/// Distribution of power demand for one meter, in kW.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerProfile {
    pub column: String,
    pub minimum: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub peak: f64,
    /// Connection limit in kW, 0 when not configured.
    pub limit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadDurationPoint {
    pub percentage_of_half_hours: f64,
    pub power: f64,
}
