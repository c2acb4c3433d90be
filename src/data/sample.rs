//! Synthetic Boston-shaped records, so the loader has input without the real
//! dataset. Every draw comes from one seeded [`Xoshiro256`], so a given
//! `(n, seed)` always yields the same rows.

use std::io::Write;

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::train::split::Xoshiro256;

/// One synthetic tract, columns named like the real dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SampleRow {
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

/// Accessibility indices that occur in the real data; 24 is the outlier band.
pub const RAD_LEVELS: [i64; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 24];

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut Xoshiro256, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.random::<f64>().max(1e-15);
    let u2 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn uniform(rng: &mut Xoshiro256, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.random::<f64>()
}

fn round(v: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (v * scale).round() / scale
}

fn sample_row(rng: &mut Xoshiro256) -> SampleRow {
    let crim = round(gauss(rng, -1.0, 1.8).exp().clamp(0.00632, 88.9762), 5);
    let zn = if rng.random_bool(0.73) {
        0.0
    } else {
        rng.random_range(1..=20) as f64 * 5.0
    };
    let indus = round(uniform(rng, 0.46, 27.74), 2);
    let chas = i64::from(rng.random_bool(0.07));
    let nox = round((0.38 + 0.017 * indus + gauss(rng, 0.0, 0.04)).clamp(0.385, 0.871), 3);
    let rm = round(gauss(rng, 6.28, 0.70).clamp(3.561, 8.78), 3);
    let age = round(uniform(rng, 2.9, 100.0), 1);
    let dis = 1.13 + 10.0 * (1.0 - age / 100.0) + gauss(rng, 0.0, 1.0);
    let dis = round(dis.clamp(1.1296, 12.1265), 4);
    let rad = if rng.random_bool(0.26) {
        24
    } else {
        RAD_LEVELS[rng.random_range(0..RAD_LEVELS.len() - 1)]
    };
    let tax = if rad == 24 {
        666.0
    } else {
        uniform(rng, 187.0, 469.0).round()
    };
    let ptratio = round(uniform(rng, 12.6, 22.0), 1);
    let b = round((396.9 - gauss(rng, 0.0, 40.0).abs()).max(0.32), 2);
    let lstat = round((12.65 + gauss(rng, 0.0, 7.0)).clamp(1.73, 37.97), 2);

    // Published OLS fit of the real data, plus noise.
    let price = 36.46 - 0.108 * crim + 0.046 * zn + 0.021 * indus + 2.69 * chas as f64
        - 17.77 * nox
        + 3.81 * rm
        + 0.0007 * age
        - 1.48 * dis
        + 0.306 * rad as f64
        - 0.0123 * tax
        - 0.953 * ptratio
        + 0.0093 * b
        - 0.525 * lstat
        + gauss(rng, 0.0, 4.7);

    SampleRow {
        crim,
        zn,
        indus,
        chas,
        nox,
        rm,
        age,
        dis,
        rad,
        tax,
        ptratio,
        b,
        lstat,
        price: round(price.clamp(5.0, 50.0), 1),
    }
}

/// `n` synthetic rows drawn from a generator seeded with `seed`.
pub fn generate(n: usize, seed: u64) -> Vec<SampleRow> {
    let mut rng = Xoshiro256::seed_from_u64(seed);
    (0..n).map(|_| sample_row(&mut rng)).collect()
}

/// Write `rows` as CSV with a header row.
pub fn write_csv<W: Write>(rows: &[SampleRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).context("writing sample row")?;
    }
    writer.flush().context("flushing sample rows")?;
    log::debug!("wrote {} sample rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SAMPLE_ROWS, SEED};
    use crate::data::loader::load_file;

    fn csv_bytes(n: usize, seed: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_csv(&generate(n, seed), &mut out).unwrap();
        out
    }

    #[test]
    fn same_seed_gives_identical_bytes() {
        let first = csv_bytes(SAMPLE_ROWS, SEED);
        let second = csv_bytes(SAMPLE_ROWS, SEED);
        assert_eq!(first, second);
        assert_ne!(first, csv_bytes(SAMPLE_ROWS, SEED + 1));
    }

    #[test]
    fn header_names_the_data_columns() {
        let bytes = csv_bytes(1, SEED);
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "CRIM,ZN,INDUS,CHAS,NOX,RM,AGE,DIS,RAD,TAX,PTRATIO,B,LSTAT,PRICE"
        );
    }

    #[test]
    fn generated_file_loads_with_valid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boston_housing.csv");
        let file = std::fs::File::create(&path).unwrap();
        write_csv(&generate(SAMPLE_ROWS, SEED), file).unwrap();

        let records = load_file(&path).unwrap();
        assert_eq!(records.len(), 506);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.id, i as i64);
            assert!(r.chas == 0 || r.chas == 1, "row {i}: CHAS {}", r.chas);
            assert!(RAD_LEVELS.contains(&r.rad), "row {i}: RAD {}", r.rad);
            assert!((0.00632..=88.9762).contains(&r.crim), "row {i}: CRIM {}", r.crim);
            assert!((0.385..=0.871).contains(&r.nox), "row {i}: NOX {}", r.nox);
            assert!((3.561..=8.78).contains(&r.rm), "row {i}: RM {}", r.rm);
            assert!((5.0..=50.0).contains(&r.price), "row {i}: PRICE {}", r.price);
            if r.rad == 24 {
                assert_eq!(r.tax, 666.0);
            }
        }
        assert!(records.iter().any(|r| r.rad == 24));
        assert!(records.iter().any(|r| r.rad != 24));
    }
}
