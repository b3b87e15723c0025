pub mod table_queries;

pub use table_queries::{
    interval_energy_to_power, monthly_totals, select_years, window_around,
    with_total_column,
};
