//! Native value-transfer primitive
//!
//! The engines never hold raw balances; they move value through this
//! boundary. `collect` models the host handing the engine the value supplied
//! with a call; `transfer` pushes value back out of the engine's custody.
//! Implementations must report failure instead of panicking so callers can
//! roll back.

use crate::types::{AccountId, Amount};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Value-transfer boundary used by the payment engine
pub trait ValueTransfer: Send + Sync {
    /// Pull `amount` supplied by `from` into engine custody.
    ///
    /// Returns false (and moves nothing) if the account is null or its
    /// balance is insufficient.
    fn collect(&self, from: &AccountId, amount: Amount) -> bool;

    /// Push `amount` out of engine custody to `to`.
    ///
    /// Returns false (and moves nothing) if the account is null, refuses the
    /// transfer, or custody does not cover the amount.
    fn transfer(&self, to: &AccountId, amount: Amount) -> bool;
}

struct BankState {
    balances: HashMap<AccountId, Amount>,
    custody: Amount,
}

/// In-memory settlement bank
///
/// The reference implementation of [`ValueTransfer`]: account balances plus a
/// single custody pool for value the engines currently hold. Accounts can be
/// marked as rejecting incoming transfers to exercise rollback paths.
pub struct SettlementBank {
    state: RwLock<BankState>,
    rejecting: RwLock<HashSet<AccountId>>,
}

impl SettlementBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BankState {
                balances: HashMap::new(),
                custody: Decimal::ZERO,
            }),
            rejecting: RwLock::new(HashSet::new()),
        }
    }

    /// Credit `amount` to `account` from outside the system
    pub fn deposit(&self, account: &AccountId, amount: Amount) {
        let mut state = self.state.write();
        *state
            .balances
            .entry(account.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Current balance of `account`
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.state
            .read()
            .balances
            .get(account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Value currently held in engine custody
    pub fn custody_balance(&self) -> Amount {
        self.state.read().custody
    }

    /// Make `account` accept or refuse incoming transfers
    pub fn set_rejecting(&self, account: &AccountId, rejecting: bool) {
        let mut set = self.rejecting.write();
        if rejecting {
            set.insert(account.clone());
        } else {
            set.remove(account);
        }
    }
}

impl Default for SettlementBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTransfer for SettlementBank {
    fn collect(&self, from: &AccountId, amount: Amount) -> bool {
        if from.is_null() || amount < Decimal::ZERO {
            return false;
        }
        let mut state = self.state.write();
        let balance = state
            .balances
            .get(from)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if balance < amount {
            tracing::warn!(%from, %amount, %balance, "collect refused: insufficient balance");
            return false;
        }
        state.balances.insert(from.clone(), balance - amount);
        state.custody += amount;
        true
    }

    fn transfer(&self, to: &AccountId, amount: Amount) -> bool {
        if to.is_null() || amount < Decimal::ZERO {
            return false;
        }
        if self.rejecting.read().contains(to) {
            tracing::warn!(%to, %amount, "transfer refused by recipient");
            return false;
        }
        let mut state = self.state.write();
        if state.custody < amount {
            tracing::warn!(%to, %amount, custody = %state.custody, "transfer refused: custody shortfall");
            return false;
        }
        state.custody -= amount;
        *state.balances.entry(to.clone()).or_insert(Decimal::ZERO) += amount;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(n: u64) -> Amount {
        Decimal::from(n)
    }

    #[test]
    fn test_collect_and_transfer() {
        let bank = SettlementBank::new();
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");

        bank.deposit(&alice, amt(100));
        assert!(bank.collect(&alice, amt(60)));
        assert_eq!(bank.balance_of(&alice), amt(40));
        assert_eq!(bank.custody_balance(), amt(60));

        assert!(bank.transfer(&bob, amt(25)));
        assert_eq!(bank.balance_of(&bob), amt(25));
        assert_eq!(bank.custody_balance(), amt(35));
    }

    #[test]
    fn test_collect_insufficient_balance() {
        let bank = SettlementBank::new();
        let alice = AccountId::new("alice");
        bank.deposit(&alice, amt(10));

        assert!(!bank.collect(&alice, amt(11)));
        assert_eq!(bank.balance_of(&alice), amt(10));
        assert_eq!(bank.custody_balance(), amt(0));
    }

    #[test]
    fn test_transfer_exceeding_custody() {
        let bank = SettlementBank::new();
        let bob = AccountId::new("bob");
        assert!(!bank.transfer(&bob, amt(1)));
        assert_eq!(bank.balance_of(&bob), amt(0));
    }

    #[test]
    fn test_null_account_refused() {
        let bank = SettlementBank::new();
        bank.deposit(&AccountId::new("alice"), amt(10));
        assert!(!bank.collect(&AccountId::null(), amt(1)));
        assert!(!bank.transfer(&AccountId::null(), amt(1)));
    }

    #[test]
    fn test_rejecting_account() {
        let bank = SettlementBank::new();
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");

        bank.deposit(&alice, amt(10));
        assert!(bank.collect(&alice, amt(10)));

        bank.set_rejecting(&bob, true);
        assert!(!bank.transfer(&bob, amt(5)));

        bank.set_rejecting(&bob, false);
        assert!(bank.transfer(&bob, amt(5)));
        assert_eq!(bank.balance_of(&bob), amt(5));
    }
}
