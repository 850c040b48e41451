//! TicketRail Platform Services
//!
//! Boundary collaborators shared by the payment and ticketing engines:
//!
//! - **Accounts & money**: opaque account identifiers, exact Decimal amounts
//! - **Access control**: role registry returning typed authorization decisions
//! - **Pause switch**: admin-gated halt for money-moving operations
//! - **Value transfer**: the native value-movement primitive (trait + in-memory bank)
//! - **Notifications**: fire-and-forget broadcast bus for off-process observers
//! - **Clock**: injectable time source so time-window rules are testable
//!
//! These are library services consumed by the engines; none of them contain
//! ticketing or fee policy.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod access;
pub mod bank;
pub mod clock;
pub mod error;
pub mod notify;
pub mod pause;
pub mod types;

// Re-exports
pub use access::{AccessControl, Decision, Role};
pub use bank::{SettlementBank, ValueTransfer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use notify::{Envelope, Notification, NotificationBus};
pub use pause::PauseSwitch;
pub use types::{AccountId, Amount, EventId, TicketId};
