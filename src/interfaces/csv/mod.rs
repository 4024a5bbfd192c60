//! Batch front-end: orders in, outcomes out, both as CSV.

pub mod order_reader;
pub mod outcome_writer;
