use std::fs::File;

use anyhow::{Context, Result};
use boston_housing::config::{SAMPLE_ROWS, SEED, SOURCE_PATH};
use boston_housing::data::sample;

fn main() -> Result<()> {
    env_logger::init();

    let rows = sample::generate(SAMPLE_ROWS, SEED);
    let file = File::create(SOURCE_PATH).with_context(|| format!("creating {SOURCE_PATH}"))?;
    sample::write_csv(&rows, file).with_context(|| format!("writing {SOURCE_PATH}"))?;

    println!("Wrote {SAMPLE_ROWS} synthetic records to {SOURCE_PATH}");
    Ok(())
}
