use std::fmt;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Schema – the fixed column list of housing_data
// ---------------------------------------------------------------------------

/// Declared SQLite type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
}

const fn col(name: &'static str, sql_type: SqlType) -> Column {
    Column { name, sql_type }
}

pub const ID_COLUMN: &str = "ID";
pub const TARGET_COLUMN: &str = "PRICE";

/// Every column of the table, in storage order.
pub const COLUMNS: [Column; 15] = [
    col(ID_COLUMN, SqlType::Integer),
    col("CRIM", SqlType::Real),
    col("ZN", SqlType::Real),
    col("INDUS", SqlType::Real),
    col("CHAS", SqlType::Integer),
    col("NOX", SqlType::Real),
    col("RM", SqlType::Real),
    col("AGE", SqlType::Real),
    col("DIS", SqlType::Real),
    col("RAD", SqlType::Integer),
    col("TAX", SqlType::Real),
    col("PTRATIO", SqlType::Real),
    col("B", SqlType::Real),
    col("LSTAT", SqlType::Real),
    col(TARGET_COLUMN, SqlType::Real),
];

/// The 13 predictors, in storage order.
pub const FEATURE_COLUMNS: [&str; 13] = [
    "CRIM", "ZN", "INDUS", "CHAS", "NOX", "RM", "AGE", "DIS", "RAD", "TAX", "PTRATIO", "B",
    "LSTAT",
];

// ---------------------------------------------------------------------------
// Value – a single raw cell
// ---------------------------------------------------------------------------

/// One cell exactly as SQLite hands it back.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing `.0` on whole numbers. Exponents stay in
            // Rust's form (`1e-5`, `1e16`), not Python's (`1e-05`, `1e+16`).
            Value::Real(v) => write!(f, "{v:?}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Blob(b) => {
                let escaped: String = b
                    .iter()
                    .flat_map(|c| c.escape_ascii())
                    .map(char::from)
                    .collect();
                write!(f, "b'{escaped}'")
            }
        }
    }
}

impl Value {
    /// Numeric cells widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer cells, or reals with no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(v) => integral(*v),
            _ => None,
        }
    }
}

/// `v` as an integer when it is finite and whole.
pub(crate) fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

/// Render a raw row like a tuple: `(0, 0.00632, 18.0, ...)`.
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(Value::to_string).collect();
    format!("({})", cells.join(", "))
}

// ---------------------------------------------------------------------------
// HousingRecord – one row of housing_data
// ---------------------------------------------------------------------------

/// One census tract: 13 predictors, the median price, and a row id.
#[derive(Debug, Clone, PartialEq)]
pub struct HousingRecord {
    pub id: i64,
    pub crim: f64,
    pub zn: f64,
    pub indus: f64,
    pub chas: i64,
    pub nox: f64,
    pub rm: f64,
    pub age: f64,
    pub dis: f64,
    pub rad: i64,
    pub tax: f64,
    pub ptratio: f64,
    pub b: f64,
    pub lstat: f64,
    pub price: f64,
}

impl HousingRecord {
    /// Cells in [`COLUMNS`] order.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Real(self.crim),
            Value::Real(self.zn),
            Value::Real(self.indus),
            Value::Integer(self.chas),
            Value::Real(self.nox),
            Value::Real(self.rm),
            Value::Real(self.age),
            Value::Real(self.dis),
            Value::Integer(self.rad),
            Value::Real(self.tax),
            Value::Real(self.ptratio),
            Value::Real(self.b),
            Value::Real(self.lstat),
            Value::Real(self.price),
        ]
    }

    /// Rebuild a record from a raw row in [`COLUMNS`] order.
    ///
    /// `row_no` is only used in error messages.
    pub fn from_row(row_no: usize, row: &[Value]) -> Result<Self> {
        if row.len() != COLUMNS.len() {
            return Err(Error::ShapeMismatch(format!(
                "row {row_no} has {} cells, expected {}",
                row.len(),
                COLUMNS.len()
            )));
        }

        let int = |i: usize| -> Result<i64> {
            row[i].as_i64().ok_or_else(|| bad_cell(row_no, i, &row[i]))
        };
        let real = |i: usize| -> Result<f64> {
            row[i].as_f64().ok_or_else(|| bad_cell(row_no, i, &row[i]))
        };

        Ok(Self {
            id: int(0)?,
            crim: real(1)?,
            zn: real(2)?,
            indus: real(3)?,
            chas: int(4)?,
            nox: real(5)?,
            rm: real(6)?,
            age: real(7)?,
            dis: real(8)?,
            rad: int(9)?,
            tax: real(10)?,
            ptratio: real(11)?,
            b: real(12)?,
            lstat: real(13)?,
            price: real(14)?,
        })
    }
}

fn bad_cell(row: usize, index: usize, value: &Value) -> Error {
    let column = COLUMNS[index];
    Error::BadValue {
        row,
        column: column.name.to_string(),
        reason: format!("{value} is not a valid {}", column.sql_type.as_sql()),
    }
}
