use time::PrimitiveDateTime;

/// Rejections raised while building or reading a [`crate::TimeSeriesTable`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("index is not strictly increasing at row {position}: {current} follows {previous}")]
    UnorderedIndex {
        position: usize,
        previous: PrimitiveDateTime,
        current: PrimitiveDateTime,
    },
    #[error("column '{name}' has {actual} values but the index has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("missing column '{0}'")]
    MissingColumn(String),
}
