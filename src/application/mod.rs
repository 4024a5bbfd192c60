//! Application layer wiring stations, workers and the shared register.
//!
//! [`kiosk::Kiosk`] builds one [`worker::Worker`] per station, each running
//! on its own tokio task, and is the entry point for submitting orders and
//! awaiting their outcome.

pub mod kiosk;
pub mod worker;
