//! Error types for connectivity impact analysis

use thiserror::Error;

/// Main error type for scenario comparison
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// The two grids being compared are not co-registered.
    #[error("Raster grids are not co-registered: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Missing or inconsistent configuration. Aborts the whole run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A product cannot be computed because one of its inputs is absent.
    #[error("Input missing for {product}: {reason}")]
    InputMissing {
        product: &'static str,
        reason: String,
    },

    #[error("Unknown category: {0} is not in the configured category table")]
    UnknownCategory(String),

    /// Jaccard dissimilarity is undefined when neither mask contains the category.
    #[error("Category {class_id} is absent from both scenarios; Jaccard union is empty")]
    EmptyUnion { class_id: i32 },

    #[error("Summary tables do not align: {0}")]
    TableMismatch(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error only degrades one output product instead of the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InputMissing { .. } | Error::TableMismatch(_))
    }
}

/// Result type alias for connectivity impact operations
pub type Result<T> = std::result::Result<T, Error>;
