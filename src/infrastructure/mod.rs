//! Shared in-memory state the workers operate on.

pub mod cash_register;
pub mod station;
