use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{COLUMNS, HousingRecord, TARGET_COLUMN, integral};

/// Alternative spelling of the target used by most public exports.
const TARGET_ALIAS: &str = "MEDV";

/// Number of data columns in a source file (everything except `ID`).
const DATA_WIDTH: usize = COLUMNS.len() - 1;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load housing records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the 14 data columns
/// * `.json`    – `[{ "CRIM": 0.00632, "ZN": 18.0, ..., "PRICE": 24.0 }, ...]`
/// * `.parquet` – one integer or float column per data column
///
/// Columns are matched by name, case-insensitively, and `MEDV` stands in for
/// `PRICE`. Extra columns (e.g. a pandas index) are ignored. Ids are the row
/// position, starting at 0.
pub fn load_file(path: &Path) -> Result<Vec<HousingRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Column matching and record assembly
// ---------------------------------------------------------------------------

/// Index in `DATA_WIDTH` order that header `name` fills, if any.
fn data_slot(name: &str) -> Option<usize> {
    let name = name.trim();
    let name = if name.eq_ignore_ascii_case(TARGET_ALIAS) {
        TARGET_COLUMN
    } else {
        name
    };
    COLUMNS[1..]
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(name))
}

/// For every data column, the position of its header in `headers`.
fn locate<S: AsRef<str>>(headers: &[S]) -> Result<[usize; DATA_WIDTH]> {
    let mut found = [None; DATA_WIDTH];
    for (i, header) in headers.iter().enumerate() {
        if let Some(slot) = data_slot(header.as_ref()) {
            if found[slot].is_some() {
                bail!("Column '{}' appears more than once", COLUMNS[slot + 1].name);
            }
            found[slot] = Some(i);
        }
    }

    let mut positions = [0; DATA_WIDTH];
    for (slot, pos) in found.into_iter().enumerate() {
        positions[slot] =
            pos.with_context(|| format!("Missing column '{}'", COLUMNS[slot + 1].name))?;
    }
    Ok(positions)
}

/// Build a record from the 14 data cells in [`COLUMNS`] order (minus `ID`).
fn assemble(id: usize, cells: &[f64; DATA_WIDTH]) -> Result<HousingRecord> {
    // SQLite stores a NaN double as NULL
    if let Some(slot) = cells.iter().position(|v| !v.is_finite()) {
        bail!(
            "Row {id}, {}: '{}' is not a finite number",
            COLUMNS[slot + 1].name,
            cells[slot]
        );
    }

    let int = |slot: usize| -> Result<i64> {
        integral(cells[slot]).with_context(|| {
            format!(
                "Row {id}, {}: '{}' is not an integer",
                COLUMNS[slot + 1].name,
                cells[slot]
            )
        })
    };

    Ok(HousingRecord {
        id: i64::try_from(id).context("row index overflows i64")?,
        crim: cells[0],
        zn: cells[1],
        indus: cells[2],
        chas: int(3)?,
        nox: cells[4],
        rm: cells[5],
        age: cells[6],
        dis: cells[7],
        rad: int(8)?,
        tax: cells[9],
        ptratio: cells[10],
        b: cells[11],
        lstat: cells[12],
        price: cells[13],
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<HousingRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let positions = locate(&headers)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut cells = [0.0; DATA_WIDTH];
        for (slot, &pos) in positions.iter().enumerate() {
            let tok = record.get(pos).unwrap_or("").trim();
            cells[slot] = tok.parse::<f64>().with_context(|| {
                format!(
                    "Row {row_no}, {}: '{tok}' is not a number",
                    COLUMNS[slot + 1].name
                )
            })?;
        }

        records.push(assemble(row_no, &cells)?);
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "CRIM": 0.00632, "ZN": 18.0, "INDUS": 2.31, "CHAS": 0, ..., "PRICE": 24.0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<HousingRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (row_no, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {row_no} is not a JSON object"))?;

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        let positions = locate(&keys).with_context(|| format!("Row {row_no}"))?;
        let values: Vec<&JsonValue> = obj.values().collect();

        let mut cells = [0.0; DATA_WIDTH];
        for (slot, &pos) in positions.iter().enumerate() {
            cells[slot] = values[pos].as_f64().with_context(|| {
                format!(
                    "Row {row_no}, {}: {} is not a number",
                    COLUMNS[slot + 1].name,
                    values[pos]
                )
            })?;
        }

        records.push(assemble(row_no, &cells)?);
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one numeric column per data column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); integer columns are widened to `f64`
/// before the integrality check on `CHAS` / `RAD`.
fn load_parquet(path: &Path) -> Result<Vec<HousingRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let positions = locate(&names)?;

        let mut columns = Vec::with_capacity(DATA_WIDTH);
        for (slot, &pos) in positions.iter().enumerate() {
            let widened = cast(batch.column(pos), &DataType::Float64).with_context(|| {
                format!("Column '{}' is not numeric", COLUMNS[slot + 1].name)
            })?;
            columns.push(widened);
        }

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let mut cells = [0.0; DATA_WIDTH];
            for (slot, column) in columns.iter().enumerate() {
                if column.is_null(row) {
                    bail!("Row {row_no}, {}: null value", COLUMNS[slot + 1].name);
                }
                cells[slot] = column.as_primitive::<Float64Type>().value(row);
            }
            records.push(assemble(row_no, &cells)?);
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, Int64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "CRIM,ZN,INDUS,CHAS,NOX,RM,AGE,DIS,RAD,TAX,PTRATIO,B,LSTAT,PRICE";

    fn write_file(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_rows_get_positional_ids() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!(
            "{HEADER}\n\
             0.00632,18.0,2.31,0.0,0.538,6.575,65.2,4.09,1.0,296.0,15.3,396.9,4.98,24.0\n\
             0.02731,0.0,7.07,0,0.469,6.421,78.9,4.9671,2,242,17.8,396.9,9.14,21.6\n"
        );
        let path = write_file(&dir, "housing.csv", &text);

        let records = load_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 0);
        assert_eq!(records[1].id, 1);
        assert_eq!(records[0].crim, 0.00632);
        assert_eq!(records[0].rad, 1);
        assert_eq!(records[1].rad, 2);
        assert_eq!(records[1].price, 21.6);
    }

    #[test]
    fn csv_accepts_medv_lowercase_and_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let text = "idx,crim,zn,indus,chas,nox,rm,age,dis,rad,tax,ptratio,b,lstat,MEDV\n\
                    7,0.1,0,1,1,0.5,6,50,4,3,300,15,390,5,30.5\n";
        let path = write_file(&dir, "housing.csv", text);

        let records = load_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 0);
        assert_eq!(records[0].chas, 1);
        assert_eq!(records[0].price, 30.5);
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let text = "CRIM,ZN\n0.1,0\n";
        let path = write_file(&dir, "housing.csv", text);

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Missing column 'INDUS'"));
    }

    #[test]
    fn fractional_integer_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{HEADER}\n0.1,0,1,0.5,0.5,6,50,4,3,300,15,390,5,30\n");
        let path = write_file(&dir, "housing.csv", &text);

        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("CHAS"));
    }

    #[test]
    fn non_finite_cells_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for bad in ["NaN", "inf", "-inf"] {
            let text = format!("{HEADER}\n0.1,0,1,0,0.5,6,50,4,3,300,15,390,{bad},30\n");
            let path = write_file(&dir, "housing.csv", &text);

            let err = load_file(&path).unwrap_err();
            let message = format!("{err:#}");
            assert!(message.contains("Row 0, LSTAT"), "{message}");
            assert!(message.contains("not a finite number"), "{message}");
        }
    }

    #[test]
    fn json_records() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"[
            {"CRIM": 0.1, "ZN": 0, "INDUS": 1, "CHAS": 0, "NOX": 0.5, "RM": 6,
             "AGE": 50, "DIS": 4, "RAD": 3, "TAX": 300, "PTRATIO": 15, "B": 390,
             "LSTAT": 5, "PRICE": 30.5}
        ]"#;
        let path = write_file(&dir, "housing.json", text);

        let records = load_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rad, 3);
        assert_eq!(records[0].tax, 300.0);
    }

    #[test]
    fn parquet_with_integer_and_float_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("housing.parquet");

        let fields: Vec<Field> = COLUMNS[1..]
            .iter()
            .map(|c| match c.name {
                "CHAS" | "RAD" => Field::new(c.name, DataType::Int64, false),
                _ => Field::new(c.name, DataType::Float64, false),
            })
            .collect();
        let arrays: Vec<ArrayRef> = COLUMNS[1..]
            .iter()
            .enumerate()
            .map(|(i, c)| -> ArrayRef {
                match c.name {
                    "CHAS" | "RAD" => Arc::new(Int64Array::from(vec![1, 0, 1])),
                    _ => Arc::new(Float64Array::from(vec![i as f64, i as f64 + 0.5, 2.0])),
                }
            })
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let records = load_file(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].id, 2);
        assert_eq!(records[0].chas, 1);
        assert_eq!(records[1].rad, 0);
        assert_eq!(records[1].zn, 1.5);
    }

    #[test]
    fn unknown_extension() {
        let err = load_file(Path::new("housing.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
