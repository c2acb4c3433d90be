use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use boston_housing::config::{DB_PATH, PREVIEW_ROWS, TrainConfig};
use boston_housing::{store, train};

fn main() -> Result<()> {
    env_logger::init();

    let table = {
        let conn = store::open(DB_PATH).with_context(|| format!("opening {DB_PATH}"))?;
        store::load_frame(&conn).context("reading housing_data")?
    };
    if log::log_enabled!(log::Level::Debug) {
        let head = table.slice(0, table.num_rows().min(PREVIEW_ROWS));
        log::debug!("\n{}", pretty_format_batches(&[head])?);
    }

    let evaluation = train::evaluate(&table, &TrainConfig::default()).context("training")?;

    for (name, coefficient) in &evaluation.coefficients {
        log::info!("{name:>8} {coefficient:+.6}");
    }
    log::info!("intercept {:+.6}", evaluation.intercept);

    println!("Mean Squared Error: {}", evaluation.mse);
    Ok(())
}
