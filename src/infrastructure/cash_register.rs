use crate::domain::change::ReturnedAmount;
use crate::error::OrderError;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Notes and coins the register works with, in cents, largest first.
///
/// The set is canonical, so the greedy pass in [`CashRegister::pay`] always
/// hands out the fewest pieces.
pub const DENOMINATIONS: [i64; 12] = [5000, 2000, 1000, 500, 200, 100, 50, 20, 10, 5, 2, 1];

/// Pieces of each denomination a register starts with.
pub const DEFAULT_STOCK: u32 = 10;

/// A cash register shared by every worker.
///
/// Holds the remaining stock of every denomination behind a single lock.
#[derive(Debug)]
pub struct CashRegister {
    stock: Mutex<BTreeMap<i64, u32>>,
}

impl Default for CashRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl CashRegister {
    /// Creates a register holding [`DEFAULT_STOCK`] pieces of every denomination.
    pub fn new() -> Self {
        Self::with_stock(DEFAULT_STOCK)
    }

    /// Creates a register holding `count` pieces of every denomination.
    pub fn with_stock(count: u32) -> Self {
        Self {
            stock: Mutex::new(DENOMINATIONS.iter().map(|d| (*d, count)).collect()),
        }
    }

    /// A snapshot of the remaining pieces per denomination.
    pub fn stock(&self) -> BTreeMap<i64, u32> {
        self.stock.lock().clone()
    }

    /// Total value of the remaining stock, in cents.
    pub fn total(&self) -> i64 {
        self.stock
            .lock()
            .iter()
            .map(|(denomination, count)| denomination * i64::from(*count))
            .sum()
    }

    /// Takes payment for an item costing `price` and hands back the change
    /// for `inserted`, both in cents.
    ///
    /// The change is taken greedily from the largest denomination down. If
    /// the stock cannot cover it, the call fails with
    /// [`OrderError::NotEnoughChange`] and the stock is left as it was.
    pub fn pay(&self, price: i64, inserted: i64) -> Result<ReturnedAmount, OrderError> {
        if price <= 0 || inserted <= 0 || inserted < price {
            return Err(OrderError::InvalidPayment);
        }

        let mut amount = inserted - price;
        if amount == 0 {
            return Ok(ReturnedAmount::none());
        }

        let mut stock = self.stock.lock();
        let mut remaining = stock.clone();
        let mut returned = BTreeMap::new();

        for denomination in DENOMINATIONS {
            if amount == 0 {
                break;
            }
            let Some(available) = remaining.get_mut(&denomination) else {
                continue;
            };
            // Bounded by the stock, which is a u32
            let wanted = u32::try_from(amount / denomination).unwrap_or(u32::MAX);
            let taken = wanted.min(*available);
            if taken == 0 {
                continue;
            }
            *available -= taken;
            amount -= denomination * i64::from(taken);
            returned.insert(denomination, taken);
        }

        if amount != 0 {
            return Err(OrderError::NotEnoughChange);
        }

        *stock = remaining;
        Ok(ReturnedAmount::from_pieces(returned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_invalid_payments() {
        let register = CashRegister::new();
        for (price, inserted) in [(0, 0), (10, 5), (-1, -10), (0, 10), (10, 0), (-5, 10)] {
            assert_eq!(
                register.pay(price, inserted),
                Err(OrderError::InvalidPayment),
                "price {price}, inserted {inserted}"
            );
        }
        assert_eq!(register.stock(), CashRegister::new().stock());
    }

    #[test]
    fn test_exact_payment_needs_no_change() {
        let register = CashRegister::with_stock(0);
        assert_eq!(register.pay(5, 5), Ok(ReturnedAmount::none()));
    }

    #[test]
    fn test_small_change() {
        let register = CashRegister::new();
        let returned = register.pay(5, 10).unwrap();
        assert_eq!(returned.cents, 5);
        assert_eq!(returned.formatted, "5 Cent");
        assert_eq!(register.stock()[&5], DEFAULT_STOCK - 1);
    }

    #[test]
    fn test_greedy_breakdown() {
        let register = CashRegister::new();
        let returned = register.pay(30, 8830).unwrap();
        assert_eq!(returned.cents, 8800);
        assert_eq!(returned.formatted, "88 Euro");
        assert_eq!(
            returned.pieces,
            BTreeMap::from([(5000, 1), (2000, 1), (1000, 1), (500, 1), (200, 1), (100, 1)])
        );
    }

    #[test]
    fn test_falls_back_to_smaller_denominations() {
        let register = CashRegister::with_stock(0);
        *register.stock.lock().get_mut(&50).unwrap() = 0;
        *register.stock.lock().get_mut(&20).unwrap() = 5;
        *register.stock.lock().get_mut(&10).unwrap() = 1;

        let returned = register.pay(30, 80).unwrap();
        assert_eq!(returned.pieces, BTreeMap::from([(20, 2), (10, 1)]));
        assert_eq!(register.stock()[&20], 3);
        assert_eq!(register.stock()[&10], 0);
    }

    #[test]
    fn test_not_enough_change_leaves_stock_untouched() {
        let register = CashRegister::with_stock(1);
        let before = register.stock();
        // 100 Euro of change, the whole register holds 88.88
        assert_eq!(register.pay(30, 10030), Err(OrderError::NotEnoughChange));
        assert_eq!(register.stock(), before);
    }

    #[test]
    fn test_runs_dry() {
        let register = CashRegister::with_stock(1);
        assert_eq!(register.pay(30, 50).unwrap().formatted, "20 Cent");
        // No 20 left; 10 + 5 + 2 + 1 = 18
        assert_eq!(register.pay(30, 50), Err(OrderError::NotEnoughChange));
        assert_eq!(register.pay(30, 48).unwrap().formatted, "18 Cent");
    }

    #[test]
    fn test_random_payments_return_exact_change() {
        let mut rng = rand::thread_rng();
        let register = CashRegister::with_stock(1_000);

        for _ in 0..500 {
            let price = rng.gen_range(1..=5_000);
            let inserted = price + rng.gen_range(0..=10_000);
            let before: u32 = register.stock().values().sum();
            let total_before = register.total();

            let returned = register.pay(price, inserted).unwrap();
            let after: u32 = register.stock().values().sum();

            assert_eq!(returned.cents, inserted - price);
            assert_eq!(before - after, returned.piece_count());
            assert_eq!(total_before - register.total(), returned.cents);
        }
    }

    #[test]
    fn test_concurrent_payments() {
        let register = std::sync::Arc::new(CashRegister::with_stock(1_000));
        let total_before = register.total();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let register = register.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        register.pay(30, 50).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(register.total(), total_before - 8 * 50 * 20);
    }
}
