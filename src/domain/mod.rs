//! Domain values: what an order is, what it costs, and what it returns.

pub mod change;
pub mod kind;
pub mod order;
