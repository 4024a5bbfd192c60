use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Writes `rows` vegan orders spread over `stations`, each paying 50 cents.
pub fn generate_orders_csv(path: &Path, rows: usize, stations: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["station", "kind", "inserted"])?;

    for i in 0..rows {
        wtr.write_record([(i % stations).to_string().as_str(), "vegan", "50"])?;
    }

    wtr.flush()?;
    Ok(())
}
