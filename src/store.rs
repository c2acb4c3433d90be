//! SQLite access for the `housing_data` table.
//!
//! Write side: create the table if absent and replace its contents in one
//! transaction. Read side: unconditional `SELECT *` scans, as raw cells, typed
//! records, or an Arrow table.

use std::path::Path;

use arrow::record_batch::RecordBatch;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};

use crate::config::TABLE;
use crate::data::frame::rows_to_batch;
use crate::data::model::{COLUMNS, HousingRecord, Value};
use crate::error::{Error, Result};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Value::Null => ValueRef::Null,
            Value::Integer(i) => ValueRef::Integer(*i),
            Value::Real(v) => ValueRef::Real(*v),
            Value::Text(s) => ValueRef::Text(s.as_bytes()),
            Value::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(cell: ValueRef<'_>) -> Self {
        match cell {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

/// Open (or create) the store file.
pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    log::debug!("opening {}", path.display());
    Ok(Connection::open(path)?)
}

fn create_sql() -> String {
    let columns: Vec<String> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let key = if i == 0 { " PRIMARY KEY" } else { "" };
            format!("{} {}{key}", c.name, c.sql_type.as_sql())
        })
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {TABLE} ({})", columns.join(", "))
}

fn insert_sql() -> String {
    let names: Vec<&str> = COLUMNS.iter().map(|c| c.name).collect();
    let slots: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {TABLE} ({}) VALUES ({})",
        names.join(", "),
        slots.join(", ")
    )
}

/// Create `housing_data` if it does not exist yet.
pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(&create_sql(), [])?;
    Ok(())
}

/// `(name, declared type)` of every column, in table order.
fn table_info(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({TABLE})"))?;
    let columns = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Column names of `housing_data`, in table order. Empty if the table is absent.
pub fn column_names(conn: &Connection) -> Result<Vec<String>> {
    Ok(table_info(conn)?.into_iter().map(|(name, _)| name).collect())
}

/// Fail unless the table has exactly the expected columns and types.
fn check_schema(conn: &Connection) -> Result<()> {
    let describe =
        |(name, ty): &(String, String)| format!("{name} {}", ty.to_ascii_uppercase());
    let found: Vec<String> = table_info(conn)?.iter().map(describe).collect();
    let expected: Vec<String> = COLUMNS
        .iter()
        .map(|c| format!("{} {}", c.name, c.sql_type.as_sql()))
        .collect();
    if found != expected {
        return Err(Error::SchemaMismatch {
            table: TABLE.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Fail on cells SQLite cannot store faithfully (a NaN double reads back as NULL).
fn check_finite(records: &[HousingRecord]) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        let row = record.to_row();
        let bad = row
            .iter()
            .position(|v| matches!(v, Value::Real(x) if !x.is_finite()));
        if let Some(index) = bad {
            return Err(Error::BadValue {
                row: i,
                column: COLUMNS[index].name.to_string(),
                reason: format!("{} is not a finite number", row[index]),
            });
        }
    }
    Ok(())
}

/// Replace the contents of `housing_data` with `records`.
///
/// Creates the table when absent. Runs in a single transaction, so either
/// every record lands or the previous contents survive untouched.
pub fn write_records(conn: &mut Connection, records: &[HousingRecord]) -> Result<usize> {
    check_finite(records)?;

    let tx = conn.transaction()?;
    create_table(&tx)?;
    check_schema(&tx)?;

    let cleared = tx.execute(&format!("DELETE FROM {TABLE}"), [])?;
    if cleared > 0 {
        log::info!("replacing {cleared} existing rows");
    }

    {
        let mut stmt = tx.prepare_cached(&insert_sql())?;
        for record in records {
            stmt.execute(params_from_iter(record.to_row()))?;
        }
    }
    tx.commit()?;

    log::info!("wrote {} rows to {TABLE}", records.len());
    Ok(records.len())
}

/// `SELECT *`: column names and every row as raw cells.
fn scan(conn: &Connection) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {TABLE}"))?;
    let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
    let width = names.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let cells = (0..width)
            .map(|i| row.get_ref(i).map(Value::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.push(cells);
    }

    log::debug!("scanned {} rows x {width} columns", rows.len());
    Ok((names, rows))
}

/// Every row of `housing_data` as raw cells, in storage order.
pub fn fetch_rows(conn: &Connection) -> Result<Vec<Vec<Value>>> {
    Ok(scan(conn)?.1)
}

/// Every row of `housing_data` as a typed record.
pub fn fetch_records(conn: &Connection) -> Result<Vec<HousingRecord>> {
    fetch_rows(conn)?
        .iter()
        .enumerate()
        .map(|(i, row)| HousingRecord::from_row(i, row))
        .collect()
}

/// The whole table as an Arrow record batch.
pub fn load_frame(conn: &Connection) -> Result<RecordBatch> {
    let (names, rows) = scan(conn)?;
    rows_to_batch(&names, &rows)
}
