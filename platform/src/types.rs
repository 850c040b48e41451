//! Shared identifier and money types
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (Decimal for money)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in native currency units.
///
/// Exact decimal arithmetic; all amounts handled by the engines are
/// integer-valued and non-negative.
pub type Amount = rust_decimal::Decimal;

/// Account identifier (wallet address, member id, etc.)
///
/// Opaque string; the empty string is the null account and is rejected
/// wherever an account receives value or ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The null account
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the null (empty) account
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event identifier, allocated monotonically by the event store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventId(u64);

impl EventId {
    /// Create from a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket identifier, unique across all events
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TicketId(u64);

impl TicketId {
    /// Create from a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
