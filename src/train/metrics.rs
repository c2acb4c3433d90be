use crate::error::{Error, Result};

/// Mean Squared Error: `(1/n) Σ (y_true − y_pred)²`.
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(Error::ShapeMismatch(format!(
            "{} targets but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(Error::EmptyInput);
    }

    let sum_sq_error: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    Ok(sum_sq_error / y_true.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        assert_eq!(mean_squared_error(&y_true, &y_pred).unwrap(), 0.375);
        assert_eq!(mean_squared_error(&y_true, &y_true).unwrap(), 0.0);
    }

    #[test]
    fn mse_rejects_bad_input() {
        assert!(matches!(mean_squared_error(&[], &[]), Err(Error::EmptyInput)));
        assert!(matches!(
            mean_squared_error(&[1.0], &[1.0, 2.0]),
            Err(Error::ShapeMismatch(_))
        ));
    }
}
