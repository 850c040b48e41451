//! High-level ticketing facade
//!
//! Spawns the single-writer actor and exposes the async operation API.
//! All collaborators are wired in at construction time; role grants are the
//! deployer's responsibility.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use platform::{AccessControl, AccountId, NotificationBus, PauseSwitch, SettlementBank, SystemClock};
//! use ticket_core::{BoxOffice, Config};
//!
//! #[tokio::main]
//! async fn main() -> ticket_core::Result<()> {
//!     let admin = AccountId::new("root");
//!     let access = Arc::new(AccessControl::with_admin(admin));
//!     let bank = Arc::new(SettlementBank::new());
//!     let pause = Arc::new(PauseSwitch::new(access.clone()));
//!     let bus = Arc::new(NotificationBus::new(256));
//!     let payments = Arc::new(payments::PaymentEngine::new(
//!         payments::Config::default(),
//!         bank,
//!         access.clone(),
//!         pause,
//!         bus.clone(),
//!     )?);
//!
//!     let office = BoxOffice::open(
//!         Config::default(),
//!         payments,
//!         access,
//!         bus,
//!         Arc::new(SystemClock),
//!     );
//!
//!     // let event_id = office.create_event(...).await?;
//!
//!     office.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_ticket_actor, TicketHandle},
    config::Config,
    engine::TicketEngine,
    error::Result,
    types::{EventRecord, EventSpec, StoreStats, TicketRecord},
};
use payments::PaymentEngine;
use platform::{AccessControl, AccountId, Amount, Clock, EventId, NotificationBus, TicketId};
use std::sync::Arc;

/// Main ticketing interface
pub struct BoxOffice {
    /// Actor handle for async operations
    handle: TicketHandle,
}

impl BoxOffice {
    /// Spawn the engine actor with wired collaborators
    pub fn open(
        config: Config,
        payments: Arc<PaymentEngine>,
        access: Arc<AccessControl>,
        bus: Arc<NotificationBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mailbox_capacity = config.mailbox_capacity;
        let engine = TicketEngine::new(&config, payments, access, bus, clock);
        let handle = spawn_ticket_actor(engine, mailbox_capacity);
        Self { handle }
    }

    /// Register a new event
    pub async fn create_event(&self, organizer: AccountId, spec: EventSpec) -> Result<EventId> {
        self.handle.create_event(organizer, spec).await
    }

    /// Cancel a published event
    pub async fn cancel_event(&self, event_id: EventId, caller: AccountId) -> Result<()> {
        self.handle.cancel_event(event_id, caller).await
    }

    /// Close an event past its end time
    pub async fn close_event(&self, event_id: EventId, caller: AccountId) -> Result<()> {
        self.handle.close_event(event_id, caller).await
    }

    /// Mint a batch of tickets against an event
    pub async fn mint_tickets(
        &self,
        event_id: EventId,
        recipients: Vec<AccountId>,
        seat_numbers: Vec<u32>,
        paid_value: Amount,
        payer: AccountId,
    ) -> Result<Vec<TicketId>> {
        self.handle
            .mint_tickets(event_id, recipients, seat_numbers, paid_value, payer)
            .await
    }

    /// List a ticket for resale
    pub async fn list_ticket_for_resale(
        &self,
        ticket_id: TicketId,
        price: Amount,
        caller: AccountId,
    ) -> Result<()> {
        self.handle
            .list_ticket_for_resale(ticket_id, price, caller)
            .await
    }

    /// Buy a listed ticket
    pub async fn buy_resale_ticket(
        &self,
        ticket_id: TicketId,
        paid_value: Amount,
        buyer: AccountId,
    ) -> Result<()> {
        self.handle.buy_resale_ticket(ticket_id, paid_value, buyer).await
    }

    /// Redeem a ticket at the venue
    pub async fn use_ticket(&self, ticket_id: TicketId, caller: AccountId) -> Result<()> {
        self.handle.use_ticket(ticket_id, caller).await
    }

    /// Refund a ticket to its current owner
    pub async fn refund_ticket(&self, ticket_id: TicketId, caller: AccountId) -> Result<Amount> {
        self.handle.refund_ticket(ticket_id, caller).await
    }

    /// Get an event record
    pub async fn event(&self, event_id: EventId) -> Result<EventRecord> {
        self.handle.event(event_id).await
    }

    /// Get a ticket record
    pub async fn ticket(&self, ticket_id: TicketId) -> Result<TicketRecord> {
        self.handle.ticket(ticket_id).await
    }

    /// Get a ticket's current owner
    pub async fn owner_of(&self, ticket_id: TicketId) -> Result<AccountId> {
        self.handle.owner_of(ticket_id).await
    }

    /// Get all tickets controlled by an account
    pub async fn tickets_of(&self, account: AccountId) -> Result<Vec<TicketId>> {
        self.handle.tickets_of(account).await
    }

    /// Get store counters
    pub async fn stats(&self) -> Result<StoreStats> {
        self.handle.stats().await
    }

    /// Cloneable handle to the same actor
    pub fn handle(&self) -> TicketHandle {
        self.handle.clone()
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> Result<()> {
        self.handle.shutdown().await
    }
}
