//! Core types for the ticketing engine
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Exact arithmetic (Decimal for money)
//! - Status invariants enforced by mutators, not by callers

use chrono::{DateTime, Utc};
use platform::{AccountId, Amount, EventId, TicketId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum number of tickets per mint call
pub const MAX_MINT_BATCH: usize = 50;

/// Parameters supplied by an organizer when creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Venue label
    pub venue: String,

    /// Scheduled start
    pub start_time: DateTime<Utc>,

    /// Scheduled end (must be after start)
    pub end_time: DateTime<Utc>,

    /// Primary sale price per ticket
    pub base_price: Amount,

    /// Capacity cap
    pub max_tickets: u32,

    /// Whether seats are exclusive per ticket
    pub seated: bool,

    /// Whether holders may relist tickets
    pub resale_allowed: bool,

    /// Resale price cap; zero means unbounded
    pub max_resale_price: Amount,
}

/// Event lifecycle status
///
/// Transitions are one-directional; there is no un-cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventStatus {
    /// Defined but not yet on sale
    Draft = 1,
    /// On sale
    Published = 2,
    /// Cancelled by the organizer (terminal)
    Cancelled = 3,
    /// Past its end time (terminal)
    Ended = 4,
}

impl EventStatus {
    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Draft, EventStatus::Published)
                | (EventStatus::Published, EventStatus::Cancelled)
                | (EventStatus::Published, EventStatus::Ended)
        )
    }

    /// Check if the status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Cancelled | EventStatus::Ended)
    }
}

/// Stored event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event ID (monotonic)
    pub event_id: EventId,

    /// Organizer account; receives primary-sale proceeds
    pub organizer: AccountId,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Venue label
    pub venue: String,

    /// Scheduled start
    pub start_time: DateTime<Utc>,

    /// Scheduled end
    pub end_time: DateTime<Utc>,

    /// Primary sale price per ticket
    pub base_price: Amount,

    /// Capacity cap
    pub max_tickets: u32,

    /// Tickets minted so far; mutated only by minting
    pub tickets_sold: u32,

    /// Whether seats are exclusive per ticket
    pub seated: bool,

    /// Whether holders may relist tickets
    pub resale_allowed: bool,

    /// Resale price cap; zero means unbounded
    pub max_resale_price: Amount,

    /// Lifecycle status
    pub status: EventStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Build a published record from an organizer's spec
    pub fn new(
        event_id: EventId,
        organizer: AccountId,
        spec: EventSpec,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            organizer,
            name: spec.name,
            description: spec.description,
            venue: spec.venue,
            start_time: spec.start_time,
            end_time: spec.end_time,
            base_price: spec.base_price,
            max_tickets: spec.max_tickets,
            tickets_sold: 0,
            seated: spec.seated,
            resale_allowed: spec.resale_allowed,
            max_resale_price: spec.max_resale_price,
            status: EventStatus::Published,
            created_at,
        }
    }

    /// Past the scheduled end
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }

    /// Within the redemption window `[start_time, end_time]`
    pub fn in_progress(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    /// Capacity not yet sold
    pub fn remaining_capacity(&self) -> u32 {
        self.max_tickets.saturating_sub(self.tickets_sold)
    }
}

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TicketStatus {
    /// Held and valid
    Active = 1,
    /// Offered for resale
    Listed = 2,
    /// Redeemed at the venue (terminal)
    Used = 3,
    /// Refunded by the organizer (terminal)
    Refunded = 4,
}

impl TicketStatus {
    /// Check if the status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Used | TicketStatus::Refunded)
    }
}

/// Stored ticket record
///
/// The owning event and purchase price never change after mint; tickets are
/// never deleted, redeemed tickets remain as historical records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Ticket ID (monotonic, unique across all events)
    pub ticket_id: TicketId,

    /// Owning event
    pub event_id: EventId,

    /// Seat number; exclusive only for seated events
    pub seat: u32,

    /// Redemption flag; `true` exactly when status is Used
    pub used: bool,

    /// Price paid at mint, immutable
    pub purchase_price: Amount,

    /// Asking price; positive exactly when status is Listed
    pub resale_price: Amount,

    /// Lifecycle status
    pub status: TicketStatus,

    /// Mint timestamp
    pub minted_at: DateTime<Utc>,
}

impl TicketRecord {
    /// Build a freshly-minted active ticket
    pub fn new(
        ticket_id: TicketId,
        event_id: EventId,
        seat: u32,
        purchase_price: Amount,
        minted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket_id,
            event_id,
            seat,
            used: false,
            purchase_price,
            resale_price: Decimal::ZERO,
            status: TicketStatus::Active,
            minted_at,
        }
    }

    /// Offer (or re-price) for resale
    pub fn list(&mut self, price: Amount) {
        self.resale_price = price;
        self.status = TicketStatus::Listed;
    }

    /// Clear the listing after a sale
    pub fn unlist(&mut self) {
        self.resale_price = Decimal::ZERO;
        self.status = TicketStatus::Active;
    }

    /// Redeem; clears any open listing
    pub fn mark_used(&mut self) {
        self.resale_price = Decimal::ZERO;
        self.used = true;
        self.status = TicketStatus::Used;
    }

    /// Refund; clears any open listing
    pub fn mark_refunded(&mut self) {
        self.resale_price = Decimal::ZERO;
        self.status = TicketStatus::Refunded;
    }

    /// Currently offered for resale
    pub fn is_listed(&self) -> bool {
        self.status == TicketStatus::Listed
    }

    /// Verify the status/flag invariants
    pub fn state_consistent(&self) -> bool {
        (self.status == TicketStatus::Used) == self.used
            && (self.status == TicketStatus::Listed) == (self.resale_price > Decimal::ZERO)
    }
}

/// Store counters reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Events registered
    pub events: usize,
    /// Tickets minted (including used and refunded)
    pub tickets: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_status_transitions() {
        assert!(EventStatus::Draft.can_transition_to(EventStatus::Published));
        assert!(EventStatus::Published.can_transition_to(EventStatus::Cancelled));
        assert!(EventStatus::Published.can_transition_to(EventStatus::Ended));

        // One-directional: no un-cancel, no re-draft
        assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Published));
        assert!(!EventStatus::Ended.can_transition_to(EventStatus::Published));
        assert!(!EventStatus::Published.can_transition_to(EventStatus::Draft));

        assert!(EventStatus::Cancelled.is_terminal());
        assert!(!EventStatus::Published.is_terminal());
    }

    #[test]
    fn test_ticket_invariants_through_mutators() {
        let mut ticket = TicketRecord::new(
            TicketId::new(1),
            EventId::new(1),
            12,
            Amount::from(10),
            Utc::now(),
        );
        assert!(ticket.state_consistent());

        ticket.list(Amount::from(15));
        assert!(ticket.is_listed());
        assert!(ticket.state_consistent());

        ticket.unlist();
        assert_eq!(ticket.status, TicketStatus::Active);
        assert!(ticket.state_consistent());

        ticket.list(Amount::from(15));
        ticket.mark_used();
        assert!(ticket.used);
        assert!(ticket.status.is_terminal());
        assert!(ticket.state_consistent());
    }

    #[test]
    fn test_redemption_window() {
        let start = Utc::now();
        let end = start + chrono::Duration::hours(2);
        let record = EventRecord::new(
            EventId::new(1),
            AccountId::new("organizer-1"),
            EventSpec {
                name: "Show".to_string(),
                description: String::new(),
                venue: "Hall A".to_string(),
                start_time: start,
                end_time: end,
                base_price: Amount::from(10),
                max_tickets: 100,
                seated: false,
                resale_allowed: true,
                max_resale_price: Amount::ZERO,
            },
            start,
        );

        assert!(record.in_progress(start));
        assert!(record.in_progress(end));
        assert!(!record.in_progress(end + chrono::Duration::seconds(1)));
        assert!(record.has_ended(end + chrono::Duration::seconds(1)));
        assert_eq!(record.remaining_capacity(), 100);
    }
}
