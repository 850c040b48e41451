//! Ownership and transfer ledger
//!
//! Forward mapping from ticket to controlling account plus a per-account
//! reverse index. Both sides are updated together by every mint, transfer,
//! and retraction, so they can never disagree.

use platform::{AccountId, TicketId};
use std::collections::{BTreeSet, HashMap};

/// Ticket ownership ledger
pub struct OwnershipLedger {
    owners: HashMap<TicketId, AccountId>,
    holdings: HashMap<AccountId, BTreeSet<TicketId>>,
}

impl OwnershipLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
            holdings: HashMap::new(),
        }
    }

    /// Current owner of a ticket
    pub fn owner_of(&self, ticket_id: TicketId) -> Option<&AccountId> {
        self.owners.get(&ticket_id)
    }

    /// Whether `account` controls `ticket_id`
    pub fn is_owner(&self, ticket_id: TicketId, account: &AccountId) -> bool {
        self.owners.get(&ticket_id) == Some(account)
    }

    /// Tickets controlled by `account`, in id order
    pub fn tickets_of(&self, account: &AccountId) -> Vec<TicketId> {
        self.holdings
            .get(account)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Record first ownership of a freshly-minted ticket
    pub fn mint_to(&mut self, ticket_id: TicketId, account: AccountId) {
        self.holdings
            .entry(account.clone())
            .or_default()
            .insert(ticket_id);
        self.owners.insert(ticket_id, account);
    }

    /// Move a ticket to a new owner, updating both reverse indexes
    pub fn transfer(&mut self, ticket_id: TicketId, to: AccountId) {
        if let Some(previous) = self.owners.get(&ticket_id).cloned() {
            if let Some(held) = self.holdings.get_mut(&previous) {
                held.remove(&ticket_id);
                if held.is_empty() {
                    self.holdings.remove(&previous);
                }
            }
        }
        self.holdings
            .entry(to.clone())
            .or_default()
            .insert(ticket_id);
        self.owners.insert(ticket_id, to);
    }

    /// Erase a ticket entirely during mint rollback
    pub fn retract(&mut self, ticket_id: TicketId) {
        if let Some(owner) = self.owners.remove(&ticket_id) {
            if let Some(held) = self.holdings.get_mut(&owner) {
                held.remove(&ticket_id);
                if held.is_empty() {
                    self.holdings.remove(&owner);
                }
            }
        }
    }

    /// Verify forward map and reverse index agree (test support)
    pub fn check_consistency(&self) -> bool {
        let forward_total = self.owners.len();
        let reverse_total: usize = self.holdings.values().map(|set| set.len()).sum();
        if forward_total != reverse_total {
            return false;
        }
        self.owners.iter().all(|(ticket_id, owner)| {
            self.holdings
                .get(owner)
                .map(|held| held.contains(ticket_id))
                .unwrap_or(false)
        })
    }
}

impl Default for OwnershipLedger {
    fn default() -> Self {
        Self::new()
    }
}
