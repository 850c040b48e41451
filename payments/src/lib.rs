//! TicketRail Payment Engine
//!
//! Splits every incoming sale into a recipient transfer and an accumulating
//! platform fee, records pending refunds, and exposes the administrative
//! fee-configuration and withdrawal surface.
//!
//! # Invariants
//!
//! - Fee conservation: recipient credit + retained fee == nominal price
//! - Value is never lost: a failed payout either rolls the operation back or
//!   lands in the pending-refund ledger
//! - Reentrancy-safe: bookkeeping commits before any external transfer, and
//!   every money-moving operation holds a single non-reentrant lock for its
//!   whole body

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod engine;
pub mod error;
pub mod fees;
pub mod metrics;

// Re-exports
pub use config::Config;
pub use engine::{PaymentEngine, PaymentKind, PaymentReceipt};
pub use error::{Error, Result};
pub use fees::{platform_fee, FEE_DENOMINATOR, MAX_FEE_RATE_PPM};
pub use metrics::Metrics;
