use thiserror::Error;

/// Errors raised by the store, the in-memory table and the regression.
#[derive(Debug, Error)]
pub enum Error {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(
        "table `{table}` has columns {found:?}, expected {expected:?}; \
         drop the table to reload it"
    )]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("row {row}, column `{column}`: {reason}")]
    BadValue {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("test_size must be between 0 and 1, got {0}")]
    InvalidTestSize(f64),

    #[error(
        "split of {n_samples} rows leaves an empty partition \
         (n_train={n_train}, n_test={n_test})"
    )]
    EmptySplit {
        n_samples: usize,
        n_train: usize,
        n_test: usize,
    },

    #[error("{n_samples} training rows cannot determine {n_params} parameters")]
    InsufficientSamples { n_samples: usize, n_params: usize },

    #[error("normal equations are singular (pivot {pivot} is not positive)")]
    Singular { pivot: usize },

    #[error("model not fitted")]
    NotFitted,

    #[error("empty input")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, Error>;
