//! Error types for the ticketing engine

use crate::types::EventStatus;
use platform::{AccountId, Amount, EventId, TicketId};
use thiserror::Error;

/// Result type for ticketing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ticketing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Event name missing
    #[error("event name must not be empty")]
    InvalidName,

    /// Start not in the future or end not after start
    #[error("invalid schedule: start must be in the future and end after start")]
    InvalidSchedule,

    /// Zero capacity
    #[error("invalid capacity: max tickets must be positive")]
    InvalidCapacity,

    /// Non-positive price
    #[error("invalid price: must be positive")]
    InvalidPrice,

    /// Mint batch with no units
    #[error("empty mint batch")]
    EmptyBatch,

    /// Mint batch above the per-call bound
    #[error("mint batch of {len} exceeds maximum of {max}")]
    BatchTooLarge {
        /// Requested batch size
        len: usize,
        /// Enforced maximum
        max: usize,
    },

    /// Recipient and seat lists differ in length
    #[error("recipients and seat numbers differ in length: {recipients} vs {seats}")]
    LengthMismatch {
        /// Number of recipients
        recipients: usize,
        /// Number of seat numbers
        seats: usize,
    },

    /// The null account cannot own tickets
    #[error("invalid recipient: the null account cannot own tickets")]
    InvalidRecipient,

    /// Unknown event
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// Event is cancelled, ended, or otherwise not on sale
    #[error("event {0} is not open for sales")]
    EventNotPublished(EventId),

    /// Event end time has passed
    #[error("event {0} has ended")]
    EventEnded(EventId),

    /// Event end time has not passed yet
    #[error("event {0} has not ended yet")]
    EventNotOver(EventId),

    /// Capacity would be exceeded
    #[error("event {0} is sold out")]
    SoldOut(EventId),

    /// Seat already reserved for this event
    #[error("seat {seat} for event {event_id} is already reserved")]
    SeatTaken {
        /// Owning event
        event_id: EventId,
        /// Requested seat
        seat: u32,
    },

    /// Unknown ticket
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// Caller does not own the ticket
    #[error("account '{account}' does not own ticket {ticket_id}")]
    NotOwner {
        /// Ticket in question
        ticket_id: TicketId,
        /// Caller that was checked
        account: AccountId,
    },

    /// Ticket was redeemed; listing/resale refused
    #[error("ticket {0} has been used")]
    TicketUsed(TicketId),

    /// Repeat redemption attempt
    #[error("ticket {0} already used")]
    AlreadyUsed(TicketId),

    /// Ticket was refunded and is terminal
    #[error("ticket {0} has been refunded")]
    TicketRefunded(TicketId),

    /// Resale purchase against a ticket that is not listed
    #[error("ticket {0} is not listed for resale")]
    NotListed(TicketId),

    /// Event forbids resale
    #[error("resale is not allowed for event {0}")]
    ResaleNotAllowed(EventId),

    /// Asking price above the event's resale cap
    #[error("price {price} exceeds resale cap {max}")]
    PriceExceedsMax {
        /// Asking price
        price: Amount,
        /// Event's cap
        max: Amount,
    },

    /// Buying one's own listing
    #[error("cannot buy own listing for ticket {0}")]
    SelfPurchase(TicketId),

    /// Supplied value below the required price
    #[error("insufficient payment: supplied {supplied}, required {required}")]
    InsufficientPayment {
        /// Value supplied with the call
        supplied: Amount,
        /// Price that had to be covered
        required: Amount,
    },

    /// Redemption outside `[start_time, end_time]`
    #[error("ticket {0} may only be redeemed between event start and end")]
    OutsideRedemptionWindow(TicketId),

    /// Illegal event status transition
    #[error("event {event_id} cannot move from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// Event in question
        event_id: EventId,
        /// Current status
        from: EventStatus,
        /// Requested status
        to: EventStatus,
    },

    /// Payment engine failure; aborts the enclosing operation
    #[error(transparent)]
    Payment(#[from] payments::Error),

    /// Authorization denied
    #[error(transparent)]
    Access(#[from] platform::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
