//! Metrics collection for the payment engine
//!
//! # Metrics
//!
//! - `payments_processed_total` - Purchases settled (primary + secondary)
//! - `payments_refunds_total` - Pending refunds recorded
//! - `payments_fees_accrued` - Total fee value retained
//! - `payments_fees_withdrawn` - Total fee value withdrawn

use prometheus::{Counter, IntCounter, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Purchases settled
    pub payments_total: IntCounter,

    /// Pending refunds recorded
    pub refunds_total: IntCounter,

    /// Total fee value retained
    pub fees_accrued: Counter,

    /// Total fee value withdrawn
    pub fees_withdrawn: Counter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with an owned registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let payments_total = IntCounter::with_opts(Opts::new(
            "payments_processed_total",
            "Purchases settled (primary + secondary)",
        ))?;
        registry.register(Box::new(payments_total.clone()))?;

        let refunds_total = IntCounter::with_opts(Opts::new(
            "payments_refunds_total",
            "Pending refunds recorded",
        ))?;
        registry.register(Box::new(refunds_total.clone()))?;

        let fees_accrued = Counter::with_opts(Opts::new(
            "payments_fees_accrued",
            "Total fee value retained",
        ))?;
        registry.register(Box::new(fees_accrued.clone()))?;

        let fees_withdrawn = Counter::with_opts(Opts::new(
            "payments_fees_withdrawn",
            "Total fee value withdrawn",
        ))?;
        registry.register(Box::new(fees_withdrawn.clone()))?;

        Ok(Self {
            payments_total,
            refunds_total,
            fees_accrued,
            fees_withdrawn,
            registry,
        })
    }

    /// Record a settled purchase and its retained fee
    pub fn record_payment(&self, fee: f64) {
        self.payments_total.inc();
        self.fees_accrued.inc_by(fee);
    }

    /// Record a pending refund
    pub fn record_refund(&self) {
        self.refunds_total.inc();
    }

    /// Record a fee withdrawal
    pub fn record_withdrawal(&self, amount: f64) {
        self.fees_withdrawn.inc_by(amount);
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
