pub mod domain;
pub mod error;
pub mod query;

pub use domain::{Column, TimeSeriesTable};
pub use error::TableError;
