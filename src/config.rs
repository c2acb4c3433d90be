// ---------------------------------------------------------------------------
// Fixed paths and training parameters. None of the binaries take flags.
// ---------------------------------------------------------------------------

/// SQLite file every binary opens.
pub const DB_PATH: &str = "boston_housing.db";

/// Record file read by `create_database` and written by `generate_sample`.
pub const SOURCE_PATH: &str = "boston_housing.csv";

pub const TABLE: &str = "housing_data";

/// Fraction of rows held out for evaluation.
pub const TEST_SIZE: f64 = 0.2;

/// Seed for the train/test shuffle and the sample generator.
pub const SEED: u64 = 42;

/// Rows printed by `retrieve_data`.
pub const PREVIEW_ROWS: usize = 5;

/// Rows written by `generate_sample` (size of the real dataset).
pub const SAMPLE_ROWS: usize = 506;

/// Parameters of one train/evaluate run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub test_size: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_size: TEST_SIZE,
            seed: SEED,
        }
    }
}
