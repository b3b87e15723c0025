pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use error::AnalyticsError;
pub use pipeline::Pipeline;
