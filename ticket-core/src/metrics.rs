//! Metrics collection for the ticketing engine
//!
//! # Metrics
//!
//! - `ticketing_events_created_total` - Events registered
//! - `ticketing_tickets_minted_total` - Tickets minted on the primary market
//! - `ticketing_tickets_resold_total` - Secondary-market sales
//! - `ticketing_tickets_redeemed_total` - Tickets marked used
//! - `ticketing_tickets_refunded_total` - Tickets refunded
//! - `ticketing_mint_batch_size` - Histogram of mint batch sizes

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Events registered
    pub events_created: IntCounter,

    /// Tickets minted
    pub tickets_minted: IntCounter,

    /// Secondary-market sales
    pub tickets_resold: IntCounter,

    /// Tickets marked used
    pub tickets_redeemed: IntCounter,

    /// Tickets refunded
    pub tickets_refunded: IntCounter,

    /// Mint batch sizes
    pub mint_batch_size: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with an owned registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let events_created = IntCounter::with_opts(Opts::new(
            "ticketing_events_created_total",
            "Events registered",
        ))?;
        registry.register(Box::new(events_created.clone()))?;

        let tickets_minted = IntCounter::with_opts(Opts::new(
            "ticketing_tickets_minted_total",
            "Tickets minted on the primary market",
        ))?;
        registry.register(Box::new(tickets_minted.clone()))?;

        let tickets_resold = IntCounter::with_opts(Opts::new(
            "ticketing_tickets_resold_total",
            "Secondary-market sales",
        ))?;
        registry.register(Box::new(tickets_resold.clone()))?;

        let tickets_redeemed = IntCounter::with_opts(Opts::new(
            "ticketing_tickets_redeemed_total",
            "Tickets marked used",
        ))?;
        registry.register(Box::new(tickets_redeemed.clone()))?;

        let tickets_refunded = IntCounter::with_opts(Opts::new(
            "ticketing_tickets_refunded_total",
            "Tickets refunded",
        ))?;
        registry.register(Box::new(tickets_refunded.clone()))?;

        let mint_batch_size = Histogram::with_opts(
            HistogramOpts::new("ticketing_mint_batch_size", "Histogram of mint batch sizes")
                .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0]),
        )?;
        registry.register(Box::new(mint_batch_size.clone()))?;

        Ok(Self {
            events_created,
            tickets_minted,
            tickets_resold,
            tickets_redeemed,
            tickets_refunded,
            mint_batch_size,
            registry,
        })
    }

    /// Record event creation
    pub fn record_event_created(&self) {
        self.events_created.inc();
    }

    /// Record a mint batch
    pub fn record_mint(&self, batch_size: usize) {
        self.tickets_minted.inc_by(batch_size as u64);
        self.mint_batch_size.observe(batch_size as f64);
    }

    /// Record a resale purchase
    pub fn record_resale(&self) {
        self.tickets_resold.inc();
    }

    /// Record a redemption
    pub fn record_redemption(&self) {
        self.tickets_redeemed.inc();
    }

    /// Record a refund
    pub fn record_refund(&self) {
        self.tickets_refunded.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
