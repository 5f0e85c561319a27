use thiserror::Error;

/// Validation failures raised while turning raw rows into passengers.
///
/// Loader functions return `anyhow::Result`; these travel inside it so the
/// UI can print the full context chain while tests can still
/// `downcast_ref::<DataError>()` to check the cause.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("record {record}: missing value for '{column}'")]
    MissingValue { record: usize, column: &'static str },

    #[error("record {record}: class must be 1, 2 or 3, got {value}")]
    InvalidClass { record: usize, value: i64 },

    #[error("record {record}: survived must be 0 or 1, got {value}")]
    InvalidOutcome { record: usize, value: i64 },

    #[error("record {record}: '{column}' must be a non-negative number, got {value}")]
    InvalidNumber {
        record: usize,
        column: &'static str,
        value: f64,
    },

    #[error("record {record}: '{column}' does not fit a passenger count, got {value}")]
    CountOutOfRange {
        record: usize,
        column: &'static str,
        value: u64,
    },

    #[error("record {record}: column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        record: usize,
        column: &'static str,
        data_type: String,
    },
}
