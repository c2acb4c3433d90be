//! The structured in-memory table the trainer works on.
//!
//! Raw store rows become an Arrow [`RecordBatch`] with one typed column per
//! table column; the trainer then projects away `ID` / `PRICE` and pulls the
//! remaining columns out as a row-major `f64` [`Matrix`].

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BinaryBuilder, Float64Builder, Int64Builder, StringBuilder,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use super::model::Value;
use crate::error::{Error, Result};
use crate::train::Matrix;

/// Arrow type a column of raw cells maps to.
///
/// Any text makes the column `Utf8`; otherwise any blob makes it `Binary`;
/// otherwise any real makes it `Float64`; otherwise (integers and nulls only,
/// or no rows at all) it is `Int64`.
fn infer_type<'a>(cells: impl Iterator<Item = &'a Value>) -> DataType {
    let mut has_real = false;
    let mut has_blob = false;
    for cell in cells {
        match cell {
            Value::Text(_) => return DataType::Utf8,
            Value::Blob(_) => has_blob = true,
            Value::Real(_) => has_real = true,
            Value::Integer(_) | Value::Null => {}
        }
    }
    if has_blob {
        DataType::Binary
    } else if has_real {
        DataType::Float64
    } else {
        DataType::Int64
    }
}

fn build_column(rows: &[Vec<Value>], index: usize, data_type: &DataType) -> ArrayRef {
    let cells = rows.iter().map(|r| &r[index]);
    match data_type {
        DataType::Utf8 => {
            let mut b = StringBuilder::new();
            for cell in cells {
                match cell {
                    Value::Null => b.append_null(),
                    Value::Text(s) => b.append_value(s),
                    other => b.append_value(other.to_string()),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Binary => {
            let mut b = BinaryBuilder::new();
            for cell in cells {
                match cell {
                    Value::Null => b.append_null(),
                    Value::Blob(bytes) => b.append_value(bytes),
                    other => b.append_value(other.to_string()),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(rows.len());
            for cell in cells {
                b.append_option(cell.as_f64());
            }
            Arc::new(b.finish())
        }
        _ => {
            let mut b = Int64Builder::with_capacity(rows.len());
            for cell in cells {
                match cell {
                    Value::Integer(i) => b.append_value(*i),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
    }
}

/// Build a record batch from column names and raw rows (the `read_sql` step).
pub fn rows_to_batch(names: &[String], rows: &[Vec<Value>]) -> Result<RecordBatch> {
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != names.len()) {
        return Err(Error::ShapeMismatch(format!(
            "row {i} has {} cells for {} columns",
            row.len(),
            names.len()
        )));
    }

    let mut fields = Vec::with_capacity(names.len());
    let mut columns = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let data_type = infer_type(rows.iter().map(|r| &r[index]));
        columns.push(build_column(rows, index, &data_type));
        fields.push(Field::new(name, data_type, true));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
    log::debug!("built {} x {} table", batch.num_rows(), batch.num_columns());
    Ok(batch)
}

fn column_index(batch: &RecordBatch, name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| Error::MissingColumn(name.to_string()))
}

/// Copy of `batch` without the named columns.
pub fn drop_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let mut dropped = Vec::with_capacity(names.len());
    for name in names {
        dropped.push(column_index(batch, name)?);
    }
    let keep: Vec<usize> = (0..batch.num_columns())
        .filter(|i| !dropped.contains(i))
        .collect();
    Ok(batch.project(&keep)?)
}

/// One column widened to `f64`. Nulls are rejected.
fn numeric_column(batch: &RecordBatch, index: usize) -> Result<Vec<f64>> {
    let name = batch.schema().field(index).name().clone();
    let widened = cast(batch.column(index), &DataType::Float64)?;
    if let Some(row) = (0..widened.len()).find(|&r| widened.is_null(r)) {
        return Err(Error::BadValue {
            row,
            column: name,
            reason: "null value".into(),
        });
    }
    Ok(widened.as_primitive::<Float64Type>().values().to_vec())
}

/// Named column as a target vector.
pub fn to_vector(batch: &RecordBatch, name: &str) -> Result<Vec<f64>> {
    numeric_column(batch, column_index(batch, name)?)
}

/// Every column of `batch` as a row-major matrix.
pub fn to_matrix(batch: &RecordBatch) -> Result<Matrix> {
    let n_rows = batch.num_rows();
    let n_cols = batch.num_columns();
    let columns = (0..n_cols)
        .map(|j| numeric_column(batch, j))
        .collect::<Result<Vec<_>>>()?;

    let mut data = Vec::with_capacity(n_rows * n_cols);
    for i in 0..n_rows {
        data.extend(columns.iter().map(|c| c[i]));
    }
    Matrix::from_vec(n_rows, n_cols, data)
}
