pub mod baseline;
pub mod context;
pub mod cost;
pub mod out_of_hours;
pub mod peaks;
pub mod power_profile;
pub mod stats;
pub mod summary;

pub use baseline::{compute_baselines, BaselineCalculator, BaselineRow, BaselineTable};
pub use context::PeakContext;
pub use cost::{cost_breakdown, CostView};
pub use out_of_hours::{find_top_periods, ExpectedBaseline, OutOfHoursSegmenter};
pub use peaks::{find_top_demand_instants, PeakMode, PeakWindowDetector};
pub use power_profile::{load_duration_curve, power_overview};
pub use summary::monthly_summary;
