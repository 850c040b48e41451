//! Authoritative in-memory stores
//!
//! One owned store per entity type: events, tickets, and seat reservations.
//! All access goes through these operations; nothing hands out shared
//! mutable state. Id allocation is monotonic, with explicit retraction so a
//! failed mint can unwind an entire batch.

use crate::types::{EventRecord, TicketRecord};
use platform::{EventId, TicketId};
use std::collections::{HashMap, HashSet};

/// Store of event records
pub struct EventStore {
    events: HashMap<EventId, EventRecord>,
    next_id: u64,
}

impl EventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next event id
    pub fn allocate_id(&mut self) -> EventId {
        let id = EventId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a new record under its own id
    pub fn insert(&mut self, record: EventRecord) {
        self.events.insert(record.event_id, record);
    }

    /// Look up an event
    pub fn get(&self, event_id: EventId) -> Option<&EventRecord> {
        self.events.get(&event_id)
    }

    /// Look up an event for mutation
    pub fn get_mut(&mut self, event_id: EventId) -> Option<&mut EventRecord> {
        self.events.get_mut(&event_id)
    }

    /// Record `count` units sold; capacity is validated by the engine
    pub fn record_sales(&mut self, event_id: EventId, count: u32) {
        if let Some(event) = self.events.get_mut(&event_id) {
            event.tickets_sold += count;
            debug_assert!(event.tickets_sold <= event.max_tickets);
        }
    }

    /// Reverse `record_sales` when a mint rolls back
    pub fn release_sales(&mut self, event_id: EventId, count: u32) {
        if let Some(event) = self.events.get_mut(&event_id) {
            event.tickets_sold = event.tickets_sold.saturating_sub(count);
        }
    }

    /// Number of events registered
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events are registered
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store of ticket records
pub struct TicketStore {
    tickets: HashMap<TicketId, TicketRecord>,
    next_id: u64,
}

impl TicketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tickets: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next ticket id (unique across all events)
    pub fn allocate_id(&mut self) -> TicketId {
        let id = TicketId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a new record under its own id
    pub fn insert(&mut self, record: TicketRecord) {
        self.tickets.insert(record.ticket_id, record);
    }

    /// Look up a ticket
    pub fn get(&self, ticket_id: TicketId) -> Option<&TicketRecord> {
        self.tickets.get(&ticket_id)
    }

    /// Look up a ticket for mutation
    pub fn get_mut(&mut self, ticket_id: TicketId) -> Option<&mut TicketRecord> {
        self.tickets.get_mut(&ticket_id)
    }

    /// Remove a just-minted ticket and, when possible, un-allocate its id.
    ///
    /// Retracting in reverse allocation order fully rewinds the counter, so
    /// a rolled-back batch leaves no gap in the id sequence.
    pub fn retract(&mut self, ticket_id: TicketId) {
        self.tickets.remove(&ticket_id);
        if ticket_id.value() + 1 == self.next_id {
            self.next_id -= 1;
        }
    }

    /// Number of tickets ever minted and kept
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// True when no tickets exist
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Seat reservations for seated events, keyed by (event, seat)
///
/// Populated at mint time and never released by redemption or refund; a
/// sold seat stays consumed for the life of the event.
pub struct SeatIndex {
    reserved: HashSet<(EventId, u32)>,
}

impl SeatIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            reserved: HashSet::new(),
        }
    }

    /// Whether a seat is already reserved
    pub fn is_reserved(&self, event_id: EventId, seat: u32) -> bool {
        self.reserved.contains(&(event_id, seat))
    }

    /// Reserve a seat; false when already taken
    pub fn reserve(&mut self, event_id: EventId, seat: u32) -> bool {
        self.reserved.insert((event_id, seat))
    }

    /// Release a reservation during mint rollback
    pub fn release(&mut self, event_id: EventId, seat: u32) {
        self.reserved.remove(&(event_id, seat));
    }
}

impl Default for SeatIndex {
    fn default() -> Self {
        Self::new()
    }
}
