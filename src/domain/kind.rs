use crate::error::OrderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of item the kiosk sells.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderKind {
    Vegan,
    NonVegan,
}

impl OrderKind {
    pub const ALL: [OrderKind; 2] = [OrderKind::Vegan, OrderKind::NonVegan];

    pub fn name(&self) -> &'static str {
        match self {
            OrderKind::Vegan => "vegan",
            OrderKind::NonVegan => "non-vegan",
        }
    }

    /// Required price in cents.
    pub fn price(&self) -> i64 {
        match self {
            OrderKind::Vegan => 30,
            OrderKind::NonVegan => 35,
        }
    }
}

impl FromStr for OrderKind {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| OrderError::InvalidKind(s.to_string()))
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
