use crate::error::{KioskError, Result};
use serde::Deserialize;
use std::io::Read;

/// One order as it appears in the input file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OrderRow {
    pub station: usize,
    pub kind: String,
    pub inserted: i64,
}

/// Reads orders from a CSV source.
///
/// Wraps `csv::Reader` and yields one `Result<OrderRow>` per line, trimming
/// whitespace and tolerating ragged records.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    /// Creates a new `OrderReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes the orders.
    pub fn orders(self) -> impl Iterator<Item = Result<OrderRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(KioskError::from))
    }
}
