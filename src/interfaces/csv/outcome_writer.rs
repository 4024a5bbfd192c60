use super::order_reader::OrderRow;
use crate::domain::order::OrderOutcome;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One line of the output: the order and what became of it.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OutcomeRecord {
    pub station: usize,
    pub kind: String,
    pub inserted: i64,
    /// `ok`, or the fault class followed by the error.
    pub status: String,
    /// Change in words, e.g. "1 Euro and 50 Cent".
    pub returned: String,
    /// Change in euros, empty on failure.
    pub change: Option<Decimal>,
}

impl OutcomeRecord {
    pub fn new(row: OrderRow, outcome: &OrderOutcome) -> Self {
        let (status, returned, change) = match outcome {
            Ok(amount) => (
                "ok".to_string(),
                amount.formatted.clone(),
                Some(amount.as_euros()),
            ),
            Err(e) => (format!("{}: {}", e.fault(), e), String::new(), None),
        };
        Self {
            station: row.station,
            kind: row.kind,
            inserted: row.inserted,
            status,
            returned,
            change,
        }
    }
}

/// Writes outcomes as CSV, header first.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcomes(&mut self, records: impl IntoIterator<Item = OutcomeRecord>) -> Result<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
