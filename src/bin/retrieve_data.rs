use anyhow::{Context, Result};
use boston_housing::config::{DB_PATH, PREVIEW_ROWS};
use boston_housing::data::model::format_row;
use boston_housing::store;

fn main() -> Result<()> {
    env_logger::init();

    let rows = {
        let conn = store::open(DB_PATH).with_context(|| format!("opening {DB_PATH}"))?;
        store::fetch_rows(&conn).context("reading housing_data")?
    };

    for row in rows.iter().take(PREVIEW_ROWS) {
        println!("{}", format_row(row));
    }
    Ok(())
}
