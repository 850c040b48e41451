//! Ticket lifecycle orchestration
//!
//! Validates every operation against the event registry and ownership
//! ledger, invokes the payment engine for money-moving transitions, and
//! commits its own state only after payment succeeds. Minting journals its
//! mutations so a payment failure unwinds the whole batch, id counters
//! included.
//!
//! The engine is owned by a single actor task (see [`crate::actor`]); its
//! methods assume exclusive access and never interleave.

use crate::{
    config::Config,
    error::{Error, Result},
    metrics::Metrics,
    ownership::OwnershipLedger,
    store::{EventStore, SeatIndex, TicketStore},
    types::{EventRecord, EventSpec, EventStatus, StoreStats, TicketRecord, MAX_MINT_BATCH},
};
use payments::PaymentEngine;
use platform::{
    AccessControl, AccountId, Amount, Clock, EventId, Notification, NotificationBus, Role,
    TicketId,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;

/// Ticket lifecycle engine
pub struct TicketEngine {
    /// Event registry
    events: EventStore,

    /// Ticket records
    tickets: TicketStore,

    /// Seat reservations for seated events
    seats: SeatIndex,

    /// Ownership ledger (forward map + reverse index)
    ownership: OwnershipLedger,

    /// Payment engine invoked for every money-moving transition
    payments: Arc<PaymentEngine>,

    /// Authorization policy
    access: Arc<AccessControl>,

    /// Notification bus
    bus: Arc<NotificationBus>,

    /// Time source
    clock: Arc<dyn Clock>,

    /// Identity presented to the payment engine; holds the ticket-issuer role
    service_account: AccountId,

    /// Metrics
    metrics: Metrics,
}

impl TicketEngine {
    /// Create an engine from configuration and wired collaborators
    pub fn new(
        config: &Config,
        payments: Arc<PaymentEngine>,
        access: Arc<AccessControl>,
        bus: Arc<NotificationBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events: EventStore::new(),
            tickets: TicketStore::new(),
            seats: SeatIndex::new(),
            ownership: OwnershipLedger::new(),
            payments,
            access,
            bus,
            clock,
            service_account: AccountId::new(config.service_account.clone()),
            metrics: Metrics::default(),
        }
    }

    /// Register a new event; organizer role required
    pub fn create_event(&mut self, organizer: &AccountId, spec: EventSpec) -> Result<EventId> {
        self.access.require(Role::Organizer, organizer)?;

        let now = self.clock.now();
        if spec.name.is_empty() {
            return Err(Error::InvalidName);
        }
        if spec.start_time <= now || spec.end_time <= spec.start_time {
            return Err(Error::InvalidSchedule);
        }
        if spec.max_tickets == 0 {
            return Err(Error::InvalidCapacity);
        }
        if spec.base_price <= Decimal::ZERO || spec.max_resale_price < Decimal::ZERO {
            return Err(Error::InvalidPrice);
        }

        let event_id = self.events.allocate_id();
        let record = EventRecord::new(event_id, organizer.clone(), spec, now);
        let (name, start_time, end_time) = (record.name.clone(), record.start_time, record.end_time);
        self.events.insert(record);

        self.metrics.record_event_created();
        tracing::info!(%event_id, %organizer, %name, "event created");
        self.bus.publish(Notification::EventCreated {
            event_id,
            organizer: organizer.clone(),
            name,
            start_time,
            end_time,
        });

        Ok(event_id)
    }

    /// Cancel a published event; organizer or admin only.
    ///
    /// Cancellation is one-directional and purely a status change: seats stay
    /// consumed, `tickets_sold` stays put, and existing tickets are refunded
    /// individually through [`TicketEngine::refund_ticket`].
    pub fn cancel_event(&mut self, event_id: EventId, caller: &AccountId) -> Result<()> {
        let (organizer, status) = {
            let event = self.events.get(event_id).ok_or(Error::EventNotFound(event_id))?;
            (event.organizer.clone(), event.status)
        };
        self.require_organizer_or_admin(&organizer, caller)?;

        if !status.can_transition_to(EventStatus::Cancelled) {
            return Err(Error::InvalidStatusTransition {
                event_id,
                from: status,
                to: EventStatus::Cancelled,
            });
        }

        if let Some(event) = self.events.get_mut(event_id) {
            event.status = EventStatus::Cancelled;
        }
        tracing::info!(%event_id, %caller, "event cancelled");
        self.bus.publish(Notification::EventCancelled { event_id });
        Ok(())
    }

    /// Mark a published event Ended once its end time has passed;
    /// organizer or admin only. Bookkeeping only: sales windows are enforced
    /// by the schedule, never by this status.
    pub fn close_event(&mut self, event_id: EventId, caller: &AccountId) -> Result<()> {
        let (organizer, status, end_time) = {
            let event = self.events.get(event_id).ok_or(Error::EventNotFound(event_id))?;
            (event.organizer.clone(), event.status, event.end_time)
        };
        self.require_organizer_or_admin(&organizer, caller)?;

        if self.clock.now() <= end_time {
            return Err(Error::EventNotOver(event_id));
        }
        if !status.can_transition_to(EventStatus::Ended) {
            return Err(Error::InvalidStatusTransition {
                event_id,
                from: status,
                to: EventStatus::Ended,
            });
        }

        if let Some(event) = self.events.get_mut(event_id) {
            event.status = EventStatus::Ended;
        }
        tracing::info!(%event_id, "event closed");
        self.bus.publish(Notification::EventClosed { event_id });
        Ok(())
    }

    /// Mint a batch of tickets against an event.
    ///
    /// Capacity is enforced for the whole batch up front: a batch that does
    /// not fit the remaining capacity fails entirely, so `tickets_sold` can
    /// never exceed `max_tickets`. All ticket, seat, and ownership mutations
    /// are journaled and unwound if the primary-purchase payment fails.
    pub fn mint_tickets(
        &mut self,
        event_id: EventId,
        recipients: Vec<AccountId>,
        seat_numbers: Vec<u32>,
        paid_value: Amount,
        payer: &AccountId,
    ) -> Result<Vec<TicketId>> {
        let count = recipients.len();
        if count == 0 {
            return Err(Error::EmptyBatch);
        }
        if count > MAX_MINT_BATCH {
            return Err(Error::BatchTooLarge {
                len: count,
                max: MAX_MINT_BATCH,
            });
        }
        if seat_numbers.len() != count {
            return Err(Error::LengthMismatch {
                recipients: count,
                seats: seat_numbers.len(),
            });
        }

        let now = self.clock.now();
        let (organizer, base_price, seated) = {
            let event = self.events.get(event_id).ok_or(Error::EventNotFound(event_id))?;
            if event.status != EventStatus::Published {
                return Err(Error::EventNotPublished(event_id));
            }
            if event.has_ended(now) {
                return Err(Error::EventEnded(event_id));
            }
            if event.tickets_sold as usize + count > event.max_tickets as usize {
                return Err(Error::SoldOut(event_id));
            }
            (event.organizer.clone(), event.base_price, event.seated)
        };

        if recipients.iter().any(|recipient| recipient.is_null()) {
            return Err(Error::InvalidRecipient);
        }

        // Seat exclusivity, including duplicates within this batch, is
        // checked before any mutation so a bad batch has no side effects.
        if seated {
            let mut batch_seats = HashSet::new();
            for &seat in &seat_numbers {
                if self.seats.is_reserved(event_id, seat) || !batch_seats.insert(seat) {
                    return Err(Error::SeatTaken { event_id, seat });
                }
            }
        }

        let nominal = base_price * Decimal::from(count as u64);
        if paid_value < nominal {
            return Err(Error::InsufficientPayment {
                supplied: paid_value,
                required: nominal,
            });
        }

        // Journaled mutations: everything below must unwind if payment fails.
        let mut minted: Vec<TicketId> = Vec::with_capacity(count);
        for (recipient, &seat) in recipients.iter().zip(seat_numbers.iter()) {
            if seated {
                self.seats.reserve(event_id, seat);
            }
            let ticket_id = self.tickets.allocate_id();
            self.tickets
                .insert(TicketRecord::new(ticket_id, event_id, seat, base_price, now));
            self.ownership.mint_to(ticket_id, recipient.clone());
            minted.push(ticket_id);
        }
        self.events.record_sales(event_id, count as u32);

        if let Err(payment_err) = self.payments.process_primary_purchase(
            &organizer,
            nominal,
            paid_value,
            payer,
            &self.service_account,
        ) {
            self.events.release_sales(event_id, count as u32);
            for &ticket_id in minted.iter().rev() {
                self.ownership.retract(ticket_id);
                self.tickets.retract(ticket_id);
            }
            if seated {
                for &seat in &seat_numbers {
                    self.seats.release(event_id, seat);
                }
            }
            tracing::warn!(%event_id, %payer, error = %payment_err, "mint rejected: payment failed, batch rolled back");
            return Err(Error::Payment(payment_err));
        }

        self.metrics.record_mint(count);
        tracing::info!(%event_id, %payer, count, "tickets minted");
        self.bus.publish(Notification::TicketsMinted {
            event_id,
            ticket_ids: minted.clone(),
            payer: payer.clone(),
        });

        Ok(minted)
    }

    /// List a ticket for resale, or re-price an existing listing
    pub fn list_ticket_for_resale(
        &mut self,
        ticket_id: TicketId,
        price: Amount,
        caller: &AccountId,
    ) -> Result<()> {
        let (event_id, status, used) = {
            let ticket = self.tickets.get(ticket_id).ok_or(Error::TicketNotFound(ticket_id))?;
            (ticket.event_id, ticket.status, ticket.used)
        };

        if !self.ownership.is_owner(ticket_id, caller) {
            return Err(Error::NotOwner {
                ticket_id,
                account: caller.clone(),
            });
        }
        if used {
            return Err(Error::TicketUsed(ticket_id));
        }
        if status == crate::types::TicketStatus::Refunded {
            return Err(Error::TicketRefunded(ticket_id));
        }

        let (resale_allowed, max_resale_price, ended) = {
            let event = self
                .events
                .get(event_id)
                .ok_or(Error::EventNotFound(event_id))?;
            (
                event.resale_allowed,
                event.max_resale_price,
                event.has_ended(self.clock.now()),
            )
        };
        if !resale_allowed {
            return Err(Error::ResaleNotAllowed(event_id));
        }
        if ended {
            return Err(Error::EventEnded(event_id));
        }
        if price <= Decimal::ZERO {
            return Err(Error::InvalidPrice);
        }
        if max_resale_price > Decimal::ZERO && price > max_resale_price {
            return Err(Error::PriceExceedsMax {
                price,
                max: max_resale_price,
            });
        }

        if let Some(ticket) = self.tickets.get_mut(ticket_id) {
            ticket.list(price);
        }
        tracing::info!(%ticket_id, %price, "ticket listed for resale");
        self.bus.publish(Notification::TicketListed { ticket_id, price });
        Ok(())
    }

    /// Buy a listed ticket. Payment settles first; ownership and listing
    /// state change only after the payment engine reports success.
    pub fn buy_resale_ticket(
        &mut self,
        ticket_id: TicketId,
        paid_value: Amount,
        buyer: &AccountId,
    ) -> Result<()> {
        let (event_id, status, used, resale_price) = {
            let ticket = self.tickets.get(ticket_id).ok_or(Error::TicketNotFound(ticket_id))?;
            (ticket.event_id, ticket.status, ticket.used, ticket.resale_price)
        };

        if used {
            return Err(Error::TicketUsed(ticket_id));
        }
        if status == crate::types::TicketStatus::Refunded {
            return Err(Error::TicketRefunded(ticket_id));
        }
        if status != crate::types::TicketStatus::Listed {
            return Err(Error::NotListed(ticket_id));
        }

        let ended = {
            let event = self
                .events
                .get(event_id)
                .ok_or(Error::EventNotFound(event_id))?;
            event.has_ended(self.clock.now())
        };
        if ended {
            return Err(Error::EventEnded(event_id));
        }

        if buyer.is_null() {
            return Err(Error::InvalidRecipient);
        }
        let seller = self
            .ownership
            .owner_of(ticket_id)
            .cloned()
            .ok_or(Error::TicketNotFound(ticket_id))?;
        if &seller == buyer {
            return Err(Error::SelfPurchase(ticket_id));
        }
        if paid_value < resale_price {
            return Err(Error::InsufficientPayment {
                supplied: paid_value,
                required: resale_price,
            });
        }

        // No ticket state has changed yet; a payment failure aborts cleanly.
        self.payments.process_secondary_purchase(
            &seller,
            resale_price,
            paid_value,
            buyer,
            &self.service_account,
        )?;

        if let Some(ticket) = self.tickets.get_mut(ticket_id) {
            ticket.unlist();
        }
        self.ownership.transfer(ticket_id, buyer.clone());

        self.metrics.record_resale();
        tracing::info!(%ticket_id, %seller, %buyer, %resale_price, "ticket resold");
        self.bus.publish(Notification::TicketSold {
            ticket_id,
            seller,
            buyer: buyer.clone(),
            price: resale_price,
        });
        Ok(())
    }

    /// Redeem a ticket at the venue; owner only, inside the event window.
    ///
    /// Redemption is terminal and never idempotent: a second attempt fails.
    /// An open listing is cleared; the holder kept control of the ticket
    /// while it was listed.
    pub fn use_ticket(&mut self, ticket_id: TicketId, caller: &AccountId) -> Result<()> {
        let (event_id, used, status) = {
            let ticket = self.tickets.get(ticket_id).ok_or(Error::TicketNotFound(ticket_id))?;
            (ticket.event_id, ticket.used, ticket.status)
        };

        if !self.ownership.is_owner(ticket_id, caller) {
            return Err(Error::NotOwner {
                ticket_id,
                account: caller.clone(),
            });
        }
        if used {
            return Err(Error::AlreadyUsed(ticket_id));
        }
        if status == crate::types::TicketStatus::Refunded {
            return Err(Error::TicketRefunded(ticket_id));
        }

        let in_window = {
            let event = self
                .events
                .get(event_id)
                .ok_or(Error::EventNotFound(event_id))?;
            event.in_progress(self.clock.now())
        };
        if !in_window {
            return Err(Error::OutsideRedemptionWindow(ticket_id));
        }

        if let Some(ticket) = self.tickets.get_mut(ticket_id) {
            ticket.mark_used();
        }

        self.metrics.record_redemption();
        tracing::info!(%ticket_id, %caller, "ticket redeemed");
        self.bus.publish(Notification::TicketUsed { ticket_id, event_id });
        Ok(())
    }

    /// Refund a ticket; organizer of the owning event or admin only.
    ///
    /// Records a pending refund of the original purchase price for the
    /// current owner and marks the ticket Refunded (terminal). The seat
    /// reservation stays consumed and `tickets_sold` is not decremented.
    pub fn refund_ticket(&mut self, ticket_id: TicketId, caller: &AccountId) -> Result<Amount> {
        let (event_id, used, status, purchase_price) = {
            let ticket = self.tickets.get(ticket_id).ok_or(Error::TicketNotFound(ticket_id))?;
            (
                ticket.event_id,
                ticket.used,
                ticket.status,
                ticket.purchase_price,
            )
        };

        let organizer = {
            let event = self
                .events
                .get(event_id)
                .ok_or(Error::EventNotFound(event_id))?;
            event.organizer.clone()
        };
        self.require_organizer_or_admin(&organizer, caller)?;

        if used {
            return Err(Error::TicketUsed(ticket_id));
        }
        if status == crate::types::TicketStatus::Refunded {
            return Err(Error::TicketRefunded(ticket_id));
        }

        let owner = self
            .ownership
            .owner_of(ticket_id)
            .cloned()
            .ok_or(Error::TicketNotFound(ticket_id))?;

        // Record the refund first; ticket state changes only on success.
        self.payments
            .process_refund(&owner, purchase_price, &self.service_account)?;

        if let Some(ticket) = self.tickets.get_mut(ticket_id) {
            ticket.mark_refunded();
        }

        self.metrics.record_refund();
        tracing::info!(%ticket_id, %owner, %purchase_price, "ticket refunded");
        self.bus.publish(Notification::TicketRefunded {
            ticket_id,
            owner,
            amount: purchase_price,
        });
        Ok(purchase_price)
    }

    /// Look up an event
    pub fn event(&self, event_id: EventId) -> Result<EventRecord> {
        self.events
            .get(event_id)
            .cloned()
            .ok_or(Error::EventNotFound(event_id))
    }

    /// Look up a ticket
    pub fn ticket(&self, ticket_id: TicketId) -> Result<TicketRecord> {
        self.tickets
            .get(ticket_id)
            .cloned()
            .ok_or(Error::TicketNotFound(ticket_id))
    }

    /// Current owner of a ticket
    pub fn owner_of(&self, ticket_id: TicketId) -> Result<AccountId> {
        self.ownership
            .owner_of(ticket_id)
            .cloned()
            .ok_or(Error::TicketNotFound(ticket_id))
    }

    /// Tickets controlled by an account, in id order
    pub fn tickets_of(&self, account: &AccountId) -> Vec<TicketId> {
        self.ownership.tickets_of(account)
    }

    /// Store counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            events: self.events.len(),
            tickets: self.tickets.len(),
        }
    }

    /// Metrics collector (for scraping)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn require_organizer_or_admin(&self, organizer: &AccountId, caller: &AccountId) -> Result<()> {
        if caller == organizer {
            return Ok(());
        }
        self.access.require(Role::Admin, caller)?;
        Ok(())
    }
}
