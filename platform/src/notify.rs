//! Notification bus for off-process observers
//!
//! Fire-and-forget: publishing never blocks and never fails the publishing
//! operation; notifications are not used for internal control flow.
//! Subscribers receive enveloped payloads over a tokio broadcast channel.

use crate::types::{AccountId, Amount, EventId, TicketId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// Structured notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// A new event was registered
    EventCreated {
        /// Event id
        event_id: EventId,
        /// Organizer account
        organizer: AccountId,
        /// Display name
        name: String,
        /// Scheduled start
        start_time: DateTime<Utc>,
        /// Scheduled end
        end_time: DateTime<Utc>,
    },
    /// An event was cancelled by its organizer
    EventCancelled {
        /// Event id
        event_id: EventId,
    },
    /// An event was closed after its end time
    EventClosed {
        /// Event id
        event_id: EventId,
    },
    /// A batch of tickets was minted
    TicketsMinted {
        /// Owning event
        event_id: EventId,
        /// Minted ticket ids, in batch order
        ticket_ids: Vec<TicketId>,
        /// Account that paid for the batch
        payer: AccountId,
    },
    /// A ticket was listed (or re-priced) for resale
    TicketListed {
        /// Ticket id
        ticket_id: TicketId,
        /// Asking price
        price: Amount,
    },
    /// A listed ticket was sold and unlisted
    TicketSold {
        /// Ticket id
        ticket_id: TicketId,
        /// Previous owner
        seller: AccountId,
        /// New owner
        buyer: AccountId,
        /// Sale price
        price: Amount,
    },
    /// A ticket was redeemed at the venue
    TicketUsed {
        /// Ticket id
        ticket_id: TicketId,
        /// Owning event
        event_id: EventId,
    },
    /// A ticket was refunded by the organizer
    TicketRefunded {
        /// Ticket id
        ticket_id: TicketId,
        /// Owner credited with the pending refund
        owner: AccountId,
        /// Refunded amount
        amount: Amount,
    },
    /// A purchase was settled by the payment engine
    PaymentProcessed {
        /// Receipt id
        receipt_id: Uuid,
        /// Account that supplied the value
        payer: AccountId,
        /// Organizer or seller credited
        recipient: AccountId,
        /// Nominal price
        nominal: Amount,
        /// Platform fee retained
        fee: Amount,
        /// True for secondary-market sales
        resale: bool,
    },
    /// The platform fee rate changed
    FeeUpdated {
        /// New rate in parts-per-mille
        rate_ppm: u32,
    },
    /// Accumulated fees were withdrawn
    FeesWithdrawn {
        /// Receiving admin account
        to: AccountId,
        /// Amount withdrawn
        amount: Amount,
    },
    /// A pending refund was recorded
    RefundIssued {
        /// Credited account
        account: AccountId,
        /// Amount added
        amount: Amount,
        /// Account's total pending balance after the credit
        total_pending: Amount,
    },
}

/// Notification envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope ID (UUIDv7 for ordering)
    pub id: Uuid,
    /// Publication timestamp
    pub timestamp: DateTime<Utc>,
    /// Payload
    pub notification: Notification,
}

impl Envelope {
    /// Wrap a notification
    pub fn new(notification: Notification) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            notification,
        }
    }
}

/// Broadcast bus for notifications
pub struct NotificationBus {
    sender: broadcast::Sender<Envelope>,
}

impl NotificationBus {
    /// Create a bus retaining up to `capacity` undelivered envelopes per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification; missing subscribers are not an error
    pub fn publish(&self, notification: Notification) {
        let envelope = Envelope::new(notification);
        tracing::debug!(id = %envelope.id, "notification published");
        let _ = self.sender.send(envelope);
    }

    /// Subscribe to all future notifications
    pub fn subscribe(&self) -> BroadcastStream<Envelope> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = NotificationBus::new(16);
        let mut stream = bus.subscribe();

        bus.publish(Notification::FeeUpdated { rate_ppm: 25 });

        let envelope = stream.next().await.unwrap().unwrap();
        match envelope.notification {
            Notification::FeeUpdated { rate_ppm } => assert_eq!(rate_ppm, 25),
            other => panic!("unexpected notification: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = NotificationBus::new(16);
        // Must not panic or error
        bus.publish(Notification::EventCancelled {
            event_id: EventId::new(1),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_envelope_serializes() {
        let envelope = Envelope::new(Notification::FeesWithdrawn {
            to: AccountId::new("root"),
            amount: Amount::from(40),
        });
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("FeesWithdrawn"));
    }
}
