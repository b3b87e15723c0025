use std::sync::Arc;

use meter_data::TimeSeriesTable;

use crate::error::AnalyticsError;

/// Produces the table an analysis runs over.
pub trait Source: Send + Sync {
    fn load(&self) -> Result<TimeSeriesTable, AnalyticsError>;
}

/// Table-to-table step applied between loading and analysis.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError>;
}

/// Consumes analysis records, e.g. writing a report.
pub trait Sink<T> {
    fn write_records(&mut self, records: &[T]) -> Result<(), AnalyticsError>;
}

pub struct Pipeline<S> {
    pub source: S,
    pub transforms: Vec<Arc<dyn Transform>>,
}

impl<S> Pipeline<S>
where
    S: Source,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            transforms: Vec::new(),
        }
    }

    pub fn with_transform<T>(mut self, transform: T) -> Self
    where
        T: Transform + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn run(&self) -> Result<TimeSeriesTable, AnalyticsError> {
        let mut table = self.source.load()?;
        tracing::info!(rows = table.len(), columns = table.columns().len(), "loaded table");

        // Apply transforms in sequence (if any).
        for t in &self.transforms {
            table = t.apply(table)?;
            tracing::debug!(transform = t.name(), rows = table.len(), "applied transform");
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_data::Column;
    use time::macros::datetime;

    struct Fixed(TimeSeriesTable);

    impl Source for Fixed {
        fn load(&self) -> Result<TimeSeriesTable, AnalyticsError> {
            Ok(self.0.clone())
        }
    }

    struct Double;

    impl Transform for Double {
        fn name(&self) -> &'static str {
            "double"
        }

        fn apply(&self, input: TimeSeriesTable) -> Result<TimeSeriesTable, AnalyticsError> {
            let values = input.column("m")?.iter().map(|v| v * 2.0).collect();
            Ok(input.with_column(Column::new("m", values))?)
        }
    }

    #[test]
    fn transforms_run_in_order() {
        let table =
            TimeSeriesTable::from_series("m", vec![(datetime!(2023-01-01 00:00), 1.5)]).unwrap();
        let pipeline = Pipeline::new(Fixed(table)).with_transform(Double).with_transform(Double);
        assert_eq!(pipeline.run().unwrap().column("m").unwrap(), &[6.0]);
    }
}
