use std::path::Path;

use anyhow::{Context, Result};
use boston_housing::config::{DB_PATH, SOURCE_PATH};
use boston_housing::data::loader::load_file;
use boston_housing::store;

fn main() -> Result<()> {
    env_logger::init();

    let records = load_file(Path::new(SOURCE_PATH))
        .with_context(|| format!("loading records from {SOURCE_PATH}"))?;

    let mut conn = store::open(DB_PATH).with_context(|| format!("opening {DB_PATH}"))?;
    let written = store::write_records(&mut conn, &records).context("writing housing_data")?;

    println!("Wrote {written} records to {DB_PATH}");
    Ok(())
}
