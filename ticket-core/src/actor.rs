//! Actor-based concurrency for the ticketing engine
//!
//! Single-writer pattern: one task owns every mutable store and applies
//! operations strictly one at a time, so each operation either commits or
//! fails atomically with no interleaving. Callers talk to the actor through
//! a cloneable handle over a bounded mailbox (backpressure) and receive
//! results on oneshot channels.

use crate::engine::TicketEngine;
use crate::error::{Error, Result};
use crate::types::{EventRecord, EventSpec, StoreStats, TicketRecord};
use platform::{AccountId, Amount, EventId, TicketId};
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ticket actor
pub enum TicketMessage {
    /// Register a new event
    CreateEvent {
        /// Organizer account
        organizer: AccountId,
        /// Event parameters
        spec: EventSpec,
        /// Response channel
        response: oneshot::Sender<Result<EventId>>,
    },

    /// Cancel a published event
    CancelEvent {
        /// Event to cancel
        event_id: EventId,
        /// Caller account
        caller: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Close an event past its end time
    CloseEvent {
        /// Event to close
        event_id: EventId,
        /// Caller account
        caller: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Mint a batch of tickets
    MintTickets {
        /// Owning event
        event_id: EventId,
        /// Ticket recipients
        recipients: Vec<AccountId>,
        /// Seat numbers, same length as recipients
        seat_numbers: Vec<u32>,
        /// Value supplied with the call
        paid_value: Amount,
        /// Paying account
        payer: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<Vec<TicketId>>>,
    },

    /// List a ticket for resale
    ListTicket {
        /// Ticket to list
        ticket_id: TicketId,
        /// Asking price
        price: Amount,
        /// Caller account (must own the ticket)
        caller: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Buy a listed ticket
    BuyResale {
        /// Ticket to buy
        ticket_id: TicketId,
        /// Value supplied with the call
        paid_value: Amount,
        /// Buying account
        buyer: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Redeem a ticket
    UseTicket {
        /// Ticket to redeem
        ticket_id: TicketId,
        /// Caller account (must own the ticket)
        caller: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Refund a ticket
    RefundTicket {
        /// Ticket to refund
        ticket_id: TicketId,
        /// Caller account (organizer or admin)
        caller: AccountId,
        /// Response channel
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Get an event record
    GetEvent {
        /// Event to fetch
        event_id: EventId,
        /// Response channel
        response: oneshot::Sender<Result<EventRecord>>,
    },

    /// Get a ticket record
    GetTicket {
        /// Ticket to fetch
        ticket_id: TicketId,
        /// Response channel
        response: oneshot::Sender<Result<TicketRecord>>,
    },

    /// Get a ticket's current owner
    OwnerOf {
        /// Ticket to look up
        ticket_id: TicketId,
        /// Response channel
        response: oneshot::Sender<Result<AccountId>>,
    },

    /// Get all tickets controlled by an account
    TicketsOf {
        /// Account to look up
        account: AccountId,
        /// Response channel
        response: oneshot::Sender<Vec<TicketId>>,
    },

    /// Get store counters
    GetStats {
        /// Response channel
        response: oneshot::Sender<StoreStats>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ticketing messages
pub struct TicketActor {
    /// The engine; exclusively owned by this task
    engine: TicketEngine,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<TicketMessage>,
}

impl TicketActor {
    /// Create new actor
    pub fn new(engine: TicketEngine, mailbox: mpsc::Receiver<TicketMessage>) -> Self {
        Self { engine, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                TicketMessage::Shutdown => break,
                _ => self.handle_message(msg),
            }
        }
        tracing::debug!("ticket actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: TicketMessage) {
        match msg {
            TicketMessage::CreateEvent {
                organizer,
                spec,
                response,
            } => {
                let _ = response.send(self.engine.create_event(&organizer, spec));
            }

            TicketMessage::CancelEvent {
                event_id,
                caller,
                response,
            } => {
                let _ = response.send(self.engine.cancel_event(event_id, &caller));
            }

            TicketMessage::CloseEvent {
                event_id,
                caller,
                response,
            } => {
                let _ = response.send(self.engine.close_event(event_id, &caller));
            }

            TicketMessage::MintTickets {
                event_id,
                recipients,
                seat_numbers,
                paid_value,
                payer,
                response,
            } => {
                let result =
                    self.engine
                        .mint_tickets(event_id, recipients, seat_numbers, paid_value, &payer);
                let _ = response.send(result);
            }

            TicketMessage::ListTicket {
                ticket_id,
                price,
                caller,
                response,
            } => {
                let _ = response.send(self.engine.list_ticket_for_resale(ticket_id, price, &caller));
            }

            TicketMessage::BuyResale {
                ticket_id,
                paid_value,
                buyer,
                response,
            } => {
                let _ = response.send(self.engine.buy_resale_ticket(ticket_id, paid_value, &buyer));
            }

            TicketMessage::UseTicket {
                ticket_id,
                caller,
                response,
            } => {
                let _ = response.send(self.engine.use_ticket(ticket_id, &caller));
            }

            TicketMessage::RefundTicket {
                ticket_id,
                caller,
                response,
            } => {
                let _ = response.send(self.engine.refund_ticket(ticket_id, &caller));
            }

            TicketMessage::GetEvent { event_id, response } => {
                let _ = response.send(self.engine.event(event_id));
            }

            TicketMessage::GetTicket {
                ticket_id,
                response,
            } => {
                let _ = response.send(self.engine.ticket(ticket_id));
            }

            TicketMessage::OwnerOf {
                ticket_id,
                response,
            } => {
                let _ = response.send(self.engine.owner_of(ticket_id));
            }

            TicketMessage::TicketsOf { account, response } => {
                let _ = response.send(self.engine.tickets_of(&account));
            }

            TicketMessage::GetStats { response } => {
                let _ = response.send(self.engine.stats());
            }

            TicketMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct TicketHandle {
    sender: mpsc::Sender<TicketMessage>,
}

impl TicketHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<TicketMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        message: TicketMessage,
        receiver: oneshot::Receiver<Result<T>>,
    ) -> Result<T> {
        self.sender
            .send(message)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        receiver
            .await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Register a new event
    pub async fn create_event(&self, organizer: AccountId, spec: EventSpec) -> Result<EventId> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::CreateEvent {
                organizer,
                spec,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Cancel a published event
    pub async fn cancel_event(&self, event_id: EventId, caller: AccountId) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::CancelEvent {
                event_id,
                caller,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Close an event past its end time
    pub async fn close_event(&self, event_id: EventId, caller: AccountId) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::CloseEvent {
                event_id,
                caller,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Mint a batch of tickets
    pub async fn mint_tickets(
        &self,
        event_id: EventId,
        recipients: Vec<AccountId>,
        seat_numbers: Vec<u32>,
        paid_value: Amount,
        payer: AccountId,
    ) -> Result<Vec<TicketId>> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::MintTickets {
                event_id,
                recipients,
                seat_numbers,
                paid_value,
                payer,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// List a ticket for resale
    pub async fn list_ticket_for_resale(
        &self,
        ticket_id: TicketId,
        price: Amount,
        caller: AccountId,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::ListTicket {
                ticket_id,
                price,
                caller,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Buy a listed ticket
    pub async fn buy_resale_ticket(
        &self,
        ticket_id: TicketId,
        paid_value: Amount,
        buyer: AccountId,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::BuyResale {
                ticket_id,
                paid_value,
                buyer,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Redeem a ticket
    pub async fn use_ticket(&self, ticket_id: TicketId, caller: AccountId) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::UseTicket {
                ticket_id,
                caller,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Refund a ticket
    pub async fn refund_ticket(&self, ticket_id: TicketId, caller: AccountId) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::RefundTicket {
                ticket_id,
                caller,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Get an event record
    pub async fn event(&self, event_id: EventId) -> Result<EventRecord> {
        let (tx, rx) = oneshot::channel();
        self.request(TicketMessage::GetEvent { event_id, response: tx }, rx)
            .await
    }

    /// Get a ticket record
    pub async fn ticket(&self, ticket_id: TicketId) -> Result<TicketRecord> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::GetTicket {
                ticket_id,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Get a ticket's current owner
    pub async fn owner_of(&self, ticket_id: TicketId) -> Result<AccountId> {
        let (tx, rx) = oneshot::channel();
        self.request(
            TicketMessage::OwnerOf {
                ticket_id,
                response: tx,
            },
            rx,
        )
        .await
    }

    /// Get all tickets controlled by an account
    pub async fn tickets_of(&self, account: AccountId) -> Result<Vec<TicketId>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TicketMessage::TicketsOf {
                account,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Get store counters
    pub async fn stats(&self) -> Result<StoreStats> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TicketMessage::GetStats { response: tx })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(TicketMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ticket actor
pub fn spawn_ticket_actor(engine: TicketEngine, mailbox_capacity: usize) -> TicketHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let actor = TicketActor::new(engine, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    TicketHandle::new(tx)
}
