//! Train / evaluate: drop `ID` and `PRICE`, split, fit OLS, score the held-out
//! rows.

pub mod linear;
pub mod matrix;
pub mod metrics;
pub mod split;

use arrow::record_batch::RecordBatch;

pub use linear::LinearRegression;
pub use matrix::Matrix;
pub use metrics::mean_squared_error;
pub use split::{Split, train_test_split};

use crate::config::TrainConfig;
use crate::data::frame::{drop_columns, to_matrix, to_vector};
use crate::data::model::{ID_COLUMN, TARGET_COLUMN};
use crate::error::Result;

/// Outcome of one train/evaluate run.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Mean squared error on the held-out rows.
    pub mse: f64,
    pub n_train: usize,
    pub n_test: usize,
    /// `(feature name, coefficient)` in column order.
    pub coefficients: Vec<(String, f64)>,
    pub intercept: f64,
}

/// Run the whole pipeline on a table loaded from the store.
pub fn evaluate(table: &RecordBatch, config: &TrainConfig) -> Result<Evaluation> {
    let features = drop_columns(table, &[ID_COLUMN, TARGET_COLUMN])?;
    let x = to_matrix(&features)?;
    let y = to_vector(table, TARGET_COLUMN)?;

    let split = train_test_split(&x, &y, config.test_size, config.seed)?;

    let mut model = LinearRegression::new();
    model.fit(&split.x_train, &split.y_train)?;

    let y_pred = model.predict(&split.x_test)?;
    let mse = mean_squared_error(&split.y_test, &y_pred)?;

    let coefficients = features
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .zip(model.coefficients().unwrap_or_default().iter().copied())
        .collect();

    let evaluation = Evaluation {
        mse,
        n_train: split.y_train.len(),
        n_test: split.y_test.len(),
        coefficients,
        intercept: model.intercept(),
    };
    log::info!(
        "fitted on {} rows, scored on {} rows: mse {}",
        evaluation.n_train,
        evaluation.n_test,
        evaluation.mse
    );
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::rows_to_batch;
    use crate::data::model::Value;

    fn table(n: usize, noise: bool) -> RecordBatch {
        let names: Vec<String> = ["ID", "A", "B", "PRICE"].iter().map(|s| s.to_string()).collect();
        let rows: Vec<Vec<Value>> = (0..n)
            .map(|i| {
                let a = i as f64;
                let b = ((i * 13) % 7) as i64;
                let wobble = if noise { ((i * 31) % 5) as f64 * 0.1 } else { 0.0 };
                vec![
                    Value::Integer(i as i64),
                    Value::Real(a),
                    Value::Integer(b),
                    Value::Real(5.0 + 0.5 * a - 2.0 * b as f64 + wobble),
                ]
            })
            .collect();
        rows_to_batch(&names, &rows).unwrap()
    }

    #[test]
    fn exact_linear_data_scores_zero() {
        let eval = evaluate(&table(40, false), &TrainConfig::default()).unwrap();
        assert_eq!((eval.n_train, eval.n_test), (32, 8));
        assert!(eval.mse < 1e-18);
        assert_eq!(eval.coefficients[0].0, "A");
        assert!((eval.coefficients[0].1 - 0.5).abs() < 1e-9);
        assert!((eval.coefficients[1].1 + 2.0).abs() < 1e-9);
        assert!((eval.intercept - 5.0).abs() < 1e-9);
    }

    #[test]
    fn mse_is_bit_reproducible() {
        let t = table(60, true);
        let a = evaluate(&t, &TrainConfig::default()).unwrap();
        let b = evaluate(&t, &TrainConfig::default()).unwrap();
        assert_eq!(a.mse.to_bits(), b.mse.to_bits());
        assert!(a.mse > 0.0);
    }
}
