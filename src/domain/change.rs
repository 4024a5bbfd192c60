use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Change handed back to a customer.
///
/// `pieces` maps each dispensed denomination (in cents) to the number of
/// notes or coins of that denomination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnedAmount {
    pub cents: i64,
    pub formatted: String,
    pub pieces: BTreeMap<i64, u32>,
}

impl ReturnedAmount {
    /// No change due.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds the amount from the dispensed pieces.
    pub fn from_pieces(pieces: BTreeMap<i64, u32>) -> Self {
        let (cents, formatted) = cents_and_readable(&pieces);
        Self {
            cents,
            formatted,
            pieces,
        }
    }

    /// Number of notes and coins handed out.
    pub fn piece_count(&self) -> u32 {
        self.pieces.values().sum()
    }

    /// The amount in euros with two decimal places.
    pub fn as_euros(&self) -> Decimal {
        Decimal::new(self.cents, 2)
    }
}

/// Sums the pieces and renders them as e.g. "1 Euro and 50 Cent".
///
/// Zero-valued groups are omitted, so no change renders as an empty string.
pub fn cents_and_readable(pieces: &BTreeMap<i64, u32>) -> (i64, String) {
    let cents: i64 = pieces
        .iter()
        .map(|(denomination, count)| denomination * i64::from(*count))
        .sum();

    let euros = cents / 100;
    let remaining_cents = cents % 100;

    let mut result = String::new();
    if euros > 0 {
        let _ = write!(result, "{euros} Euro");
    }
    if remaining_cents > 0 {
        if euros > 0 {
            result.push_str(" and ");
        }
        let _ = write!(result, "{remaining_cents} Cent");
    }

    (cents, result)
}
