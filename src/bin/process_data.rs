use anyhow::{Context, Result};
use boston_housing::config::DB_PATH;
use boston_housing::store;

fn main() -> Result<()> {
    env_logger::init();

    let records = {
        let conn = store::open(DB_PATH).with_context(|| format!("opening {DB_PATH}"))?;
        store::fetch_records(&conn).context("reading housing_data")?
    };

    for record in &records {
        println!("ID: {}, Price: {}", record.id, record.price);
    }
    Ok(())
}
