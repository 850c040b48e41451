//! Payment engine orchestration
//!
//! Every sale is split into a recipient transfer and a retained platform fee;
//! excess value above the nominal price returns to the payer. The engine owns
//! the accumulated fee balance and the pending-refund ledger.
//!
//! # Reentrancy discipline
//!
//! Every operation acquires the single engine lock with `try_lock` and holds
//! it for its entire body, external transfers included. A nested call issued
//! from inside a transfer therefore observes fully-committed bookkeeping and
//! fails with [`Error::ReentrantCall`] instead of double-spending. Internal
//! bookkeeping commits strictly before the external transfer it backs.

use crate::{
    config::Config,
    error::{Error, Result},
    fees::{platform_fee, MAX_FEE_RATE_PPM},
    metrics::Metrics,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use platform::{
    AccessControl, AccountId, Amount, Notification, NotificationBus, PauseSwitch, Role,
    ValueTransfer,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Which market a purchase settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    /// First sale by the issuing organizer
    Primary,
    /// Resale between ticket holders
    Secondary,
}

/// Settlement record returned by a successful purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Receipt ID (UUIDv7 for time-ordering)
    pub receipt_id: Uuid,

    /// Primary or secondary market
    pub kind: PaymentKind,

    /// Account that supplied the value
    pub payer: AccountId,

    /// Organizer or seller credited with the net amount
    pub recipient: AccountId,

    /// Nominal price of the sale
    pub nominal: Amount,

    /// Value supplied with the call
    pub supplied: Amount,

    /// Platform fee retained
    pub fee: Amount,

    /// Amount credited to the recipient (`nominal - fee`)
    pub net_to_recipient: Amount,

    /// Excess returned to the payer by live transfer
    pub excess_refunded: Amount,

    /// Excess parked in the pending-refund ledger because the payer's
    /// account refused the transfer
    pub excess_ledgered: Amount,

    /// Settlement timestamp
    pub timestamp: DateTime<Utc>,
}

/// Mutable engine state, guarded by the reentrancy lock
struct FeeLedger {
    /// Current fee rate (parts-per-mille)
    fee_rate_ppm: u32,

    /// Fees retained and not yet withdrawn
    accumulated_fees: Amount,

    /// Refundable amounts per account; withdrawal is an external concern
    pending_refunds: HashMap<AccountId, Amount>,
}

/// Fee-taking payment processor
pub struct PaymentEngine {
    /// Bookkeeping state; the lock doubles as the reentrancy scope
    ledger: Mutex<FeeLedger>,

    /// Native value-transfer primitive
    bank: Arc<dyn ValueTransfer>,

    /// Authorization policy
    access: Arc<AccessControl>,

    /// System pause switch
    pause: Arc<PauseSwitch>,

    /// Notification bus
    bus: Arc<NotificationBus>,

    /// Metrics
    metrics: Metrics,
}

impl PaymentEngine {
    /// Create a payment engine from configuration and wired collaborators
    pub fn new(
        config: Config,
        bank: Arc<dyn ValueTransfer>,
        access: Arc<AccessControl>,
        pause: Arc<PauseSwitch>,
        bus: Arc<NotificationBus>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: Mutex::new(FeeLedger {
                fee_rate_ppm: config.fee_rate_ppm,
                accumulated_fees: Decimal::ZERO,
                pending_refunds: HashMap::new(),
            }),
            bank,
            access,
            pause,
            bus,
            metrics: Metrics::default(),
        })
    }

    /// Settle a primary sale: organizer receives `nominal - fee`
    pub fn process_primary_purchase(
        &self,
        recipient: &AccountId,
        nominal: Amount,
        supplied: Amount,
        payer: &AccountId,
        caller: &AccountId,
    ) -> Result<PaymentReceipt> {
        self.process_purchase(PaymentKind::Primary, recipient, nominal, supplied, payer, caller)
    }

    /// Settle a secondary sale: seller receives `nominal - fee`
    pub fn process_secondary_purchase(
        &self,
        seller: &AccountId,
        nominal: Amount,
        supplied: Amount,
        payer: &AccountId,
        caller: &AccountId,
    ) -> Result<PaymentReceipt> {
        self.process_purchase(PaymentKind::Secondary, seller, nominal, supplied, payer, caller)
    }

    fn process_purchase(
        &self,
        kind: PaymentKind,
        recipient: &AccountId,
        nominal: Amount,
        supplied: Amount,
        payer: &AccountId,
        caller: &AccountId,
    ) -> Result<PaymentReceipt> {
        self.access.require(Role::TicketIssuer, caller)?;
        if self.pause.is_paused() {
            return Err(Error::SystemPaused);
        }
        if recipient.is_null() {
            return Err(Error::InvalidRecipient);
        }
        if supplied < nominal {
            return Err(Error::InsufficientPayment {
                supplied,
                required: nominal,
            });
        }

        let mut ledger = self.ledger.try_lock().ok_or(Error::ReentrantCall)?;

        let fee = platform_fee(nominal, ledger.fee_rate_ppm);
        let net = nominal - fee;
        let excess = supplied - nominal;

        // Bookkeeping commits before any external transfer.
        ledger.accumulated_fees += fee;

        if !self.bank.collect(payer, supplied) {
            ledger.accumulated_fees -= fee;
            return Err(Error::TransferFailed {
                account: payer.clone(),
                amount: supplied,
            });
        }

        if !self.bank.transfer(recipient, net) {
            // Full rollback: nothing irrevocable has happened yet.
            ledger.accumulated_fees -= fee;
            self.return_value(&mut ledger, payer, supplied);
            return Err(Error::TransferFailed {
                account: recipient.clone(),
                amount: net,
            });
        }

        let (excess_refunded, excess_ledgered) = if excess > Decimal::ZERO {
            self.return_value(&mut ledger, payer, excess)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        drop(ledger);

        let receipt = PaymentReceipt {
            receipt_id: Uuid::now_v7(),
            kind,
            payer: payer.clone(),
            recipient: recipient.clone(),
            nominal,
            supplied,
            fee,
            net_to_recipient: net,
            excess_refunded,
            excess_ledgered,
            timestamp: Utc::now(),
        };

        self.metrics.record_payment(fee.to_f64().unwrap_or(0.0));
        tracing::info!(
            kind = ?receipt.kind,
            %payer,
            %recipient,
            %nominal,
            %fee,
            "purchase settled"
        );
        self.bus.publish(Notification::PaymentProcessed {
            receipt_id: receipt.receipt_id,
            payer: payer.clone(),
            recipient: recipient.clone(),
            nominal,
            fee,
            resale: kind == PaymentKind::Secondary,
        });

        Ok(receipt)
    }

    /// Return value to `account`, falling back to the pending-refund ledger
    /// if the live transfer is refused. Value is never dropped.
    fn return_value(
        &self,
        ledger: &mut FeeLedger,
        account: &AccountId,
        amount: Amount,
    ) -> (Amount, Amount) {
        if self.bank.transfer(account, amount) {
            (amount, Decimal::ZERO)
        } else {
            let total = ledger
                .pending_refunds
                .entry(account.clone())
                .or_insert(Decimal::ZERO);
            *total += amount;
            let total_pending = *total;
            tracing::warn!(%account, %amount, "live refund refused, credited to pending-refund ledger");
            self.bus.publish(Notification::RefundIssued {
                account: account.clone(),
                amount,
                total_pending,
            });
            (Decimal::ZERO, amount)
        }
    }

    /// Record a pending refund for `account`
    pub fn process_refund(
        &self,
        account: &AccountId,
        amount: Amount,
        caller: &AccountId,
    ) -> Result<Amount> {
        self.access.require(Role::TicketIssuer, caller)?;
        if self.pause.is_paused() {
            return Err(Error::SystemPaused);
        }
        if account.is_null() {
            return Err(Error::InvalidRecipient);
        }
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidRefundAmount);
        }

        let mut ledger = self.ledger.try_lock().ok_or(Error::ReentrantCall)?;
        let total = ledger
            .pending_refunds
            .entry(account.clone())
            .or_insert(Decimal::ZERO);
        *total += amount;
        let total_pending = *total;
        drop(ledger);

        self.metrics.record_refund();
        tracing::info!(%account, %amount, %total_pending, "refund recorded");
        self.bus.publish(Notification::RefundIssued {
            account: account.clone(),
            amount,
            total_pending,
        });

        Ok(total_pending)
    }

    /// Change the platform fee rate; fee-manager only, available while paused
    pub fn set_platform_fee(&self, rate_ppm: u32, caller: &AccountId) -> Result<()> {
        self.access.require(Role::FeeManager, caller)?;
        if rate_ppm > MAX_FEE_RATE_PPM {
            return Err(Error::FeeTooHigh {
                rate_ppm,
                ceiling: MAX_FEE_RATE_PPM,
            });
        }

        let mut ledger = self.ledger.try_lock().ok_or(Error::ReentrantCall)?;
        ledger.fee_rate_ppm = rate_ppm;
        drop(ledger);

        tracing::info!(rate_ppm, "platform fee updated");
        self.bus.publish(Notification::FeeUpdated { rate_ppm });
        Ok(())
    }

    /// Drain the accumulated fee balance to the caller; admin only,
    /// available while paused
    pub fn withdraw_fees(&self, caller: &AccountId) -> Result<Amount> {
        self.access.require(Role::Admin, caller)?;

        let mut ledger = self.ledger.try_lock().ok_or(Error::ReentrantCall)?;
        if ledger.accumulated_fees == Decimal::ZERO {
            return Err(Error::NoFeesToWithdraw);
        }

        // Zero the balance before the external transfer; restore on failure.
        let amount = ledger.accumulated_fees;
        ledger.accumulated_fees = Decimal::ZERO;

        if !self.bank.transfer(caller, amount) {
            ledger.accumulated_fees = amount;
            return Err(Error::TransferFailed {
                account: caller.clone(),
                amount,
            });
        }
        drop(ledger);

        self.metrics.record_withdrawal(amount.to_f64().unwrap_or(0.0));
        tracing::info!(%caller, %amount, "fees withdrawn");
        self.bus.publish(Notification::FeesWithdrawn {
            to: caller.clone(),
            amount,
        });

        Ok(amount)
    }

    /// Current fee rate (parts-per-mille)
    pub fn fee_rate_ppm(&self) -> u32 {
        self.ledger.lock().fee_rate_ppm
    }

    /// Fees retained and not yet withdrawn
    pub fn accumulated_fees(&self) -> Amount {
        self.ledger.lock().accumulated_fees
    }

    /// Pending refund balance of `account`
    pub fn pending_refund_of(&self, account: &AccountId) -> Amount {
        self.ledger
            .lock()
            .pending_refunds
            .get(account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Metrics collector (for scraping)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::SettlementBank;

    struct Harness {
        engine: Arc<PaymentEngine>,
        bank: Arc<SettlementBank>,
        admin: AccountId,
        issuer: AccountId,
        payer: AccountId,
        organizer: AccountId,
    }

    fn amt(n: u64) -> Amount {
        Decimal::from(n)
    }

    fn harness(fee_rate_ppm: u32) -> Harness {
        let admin = AccountId::new("root");
        let issuer = AccountId::new("ticket-engine");
        let payer = AccountId::new("alice");
        let organizer = AccountId::new("organizer-1");

        let access = Arc::new(AccessControl::with_admin(admin.clone()));
        access
            .grant_role(Role::TicketIssuer, issuer.clone(), &admin)
            .unwrap();
        access
            .grant_role(Role::FeeManager, admin.clone(), &admin)
            .unwrap();

        let bank = Arc::new(SettlementBank::new());
        bank.deposit(&payer, amt(1_000));

        let pause = Arc::new(PauseSwitch::new(access.clone()));
        let bus = Arc::new(NotificationBus::new(64));
        let engine = Arc::new(
            PaymentEngine::new(
                Config {
                    fee_rate_ppm,
                    ..Default::default()
                },
                bank.clone(),
                access,
                pause,
                bus,
            )
            .unwrap(),
        );

        Harness {
            engine,
            bank,
            admin,
            issuer,
            payer,
            organizer,
        }
    }

    #[test]
    fn test_primary_fee_split() {
        let h = harness(100); // 10%

        let receipt = h
            .engine
            .process_primary_purchase(&h.organizer, amt(40), amt(40), &h.payer, &h.issuer)
            .unwrap();

        assert_eq!(receipt.fee, amt(4));
        assert_eq!(receipt.net_to_recipient, amt(36));
        assert_eq!(h.bank.balance_of(&h.organizer), amt(36));
        assert_eq!(h.bank.balance_of(&h.payer), amt(960));
        assert_eq!(h.engine.accumulated_fees(), amt(4));
        // The retained fee is exactly what stays in custody
        assert_eq!(h.bank.custody_balance(), amt(4));
    }

    #[test]
    fn test_excess_refunded_to_payer() {
        let h = harness(100);

        let receipt = h
            .engine
            .process_primary_purchase(&h.organizer, amt(40), amt(55), &h.payer, &h.issuer)
            .unwrap();

        assert_eq!(receipt.excess_refunded, amt(15));
        assert_eq!(receipt.excess_ledgered, amt(0));
        // Payer is only down the nominal price
        assert_eq!(h.bank.balance_of(&h.payer), amt(960));
    }

    #[test]
    fn test_insufficient_payment_rejected() {
        let h = harness(100);

        let err = h
            .engine
            .process_primary_purchase(&h.organizer, amt(40), amt(39), &h.payer, &h.issuer)
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientPayment { .. }));
        assert_eq!(h.bank.balance_of(&h.payer), amt(1_000));
        assert_eq!(h.engine.accumulated_fees(), amt(0));
    }

    #[test]
    fn test_null_recipient_rejected() {
        let h = harness(100);

        let err = h
            .engine
            .process_primary_purchase(&AccountId::null(), amt(40), amt(40), &h.payer, &h.issuer)
            .unwrap_err();

        assert_eq!(err, Error::InvalidRecipient);
    }

    #[test]
    fn test_caller_must_be_ticket_issuer() {
        let h = harness(100);

        let err = h
            .engine
            .process_primary_purchase(&h.organizer, amt(40), amt(40), &h.payer, &h.payer)
            .unwrap_err();

        assert!(matches!(err, Error::Access(_)));
    }

    #[test]
    fn test_paused_blocks_money_movement_but_not_admin() {
        let h = harness(100);
        h.engine
            .process_primary_purchase(&h.organizer, amt(40), amt(40), &h.payer, &h.issuer)
            .unwrap();

        h.engine.pause.pause(&h.admin).unwrap();

        let err = h
            .engine
            .process_secondary_purchase(&h.organizer, amt(10), amt(10), &h.payer, &h.issuer)
            .unwrap_err();
        assert_eq!(err, Error::SystemPaused);

        let err = h
            .engine
            .process_refund(&h.payer, amt(5), &h.issuer)
            .unwrap_err();
        assert_eq!(err, Error::SystemPaused);

        // Fee administration stays available while paused
        h.engine.set_platform_fee(50, &h.admin).unwrap();
        let withdrawn = h.engine.withdraw_fees(&h.admin).unwrap();
        assert_eq!(withdrawn, amt(4));
    }

    #[test]
    fn test_fee_ceiling_enforced() {
        let h = harness(25);

        let err = h
            .engine
            .set_platform_fee(MAX_FEE_RATE_PPM + 1, &h.admin)
            .unwrap_err();
        assert!(matches!(err, Error::FeeTooHigh { .. }));
        assert_eq!(h.engine.fee_rate_ppm(), 25);

        h.engine.set_platform_fee(MAX_FEE_RATE_PPM, &h.admin).unwrap();
        assert_eq!(h.engine.fee_rate_ppm(), MAX_FEE_RATE_PPM);
    }

    #[test]
    fn test_withdraw_drains_to_zero() {
        let h = harness(100);
        h.engine
            .process_primary_purchase(&h.organizer, amt(100), amt(100), &h.payer, &h.issuer)
            .unwrap();
        assert_eq!(h.engine.accumulated_fees(), amt(10));

        let withdrawn = h.engine.withdraw_fees(&h.admin).unwrap();
        assert_eq!(withdrawn, amt(10));
        assert_eq!(h.engine.accumulated_fees(), amt(0));
        assert_eq!(h.bank.balance_of(&h.admin), amt(10));

        let err = h.engine.withdraw_fees(&h.admin).unwrap_err();
        assert_eq!(err, Error::NoFeesToWithdraw);
    }

    #[test]
    fn test_withdraw_transfer_failure_restores_balance() {
        let h = harness(100);
        h.engine
            .process_primary_purchase(&h.organizer, amt(100), amt(100), &h.payer, &h.issuer)
            .unwrap();

        h.bank.set_rejecting(&h.admin, true);
        let err = h.engine.withdraw_fees(&h.admin).unwrap_err();
        assert!(matches!(err, Error::TransferFailed { .. }));
        assert_eq!(h.engine.accumulated_fees(), amt(10));
    }

    #[test]
    fn test_recipient_transfer_failure_rolls_back() {
        let h = harness(100);

        h.bank.set_rejecting(&h.organizer, true);
        let err = h
            .engine
            .process_primary_purchase(&h.organizer, amt(40), amt(50), &h.payer, &h.issuer)
            .unwrap_err();

        assert!(matches!(err, Error::TransferFailed { .. }));
        // Zero net effect: supplied value returned, no fee retained
        assert_eq!(h.bank.balance_of(&h.payer), amt(1_000));
        assert_eq!(h.engine.accumulated_fees(), amt(0));
        assert_eq!(h.bank.custody_balance(), amt(0));
    }

    #[test]
    fn test_excess_refund_failure_lands_in_pending_ledger() {
        let h = harness(100);

        // Payer accepts debits but refuses incoming transfers
        h.bank.set_rejecting(&h.payer, true);
        let receipt = h
            .engine
            .process_primary_purchase(&h.organizer, amt(40), amt(55), &h.payer, &h.issuer)
            .unwrap();

        assert_eq!(receipt.excess_refunded, amt(0));
        assert_eq!(receipt.excess_ledgered, amt(15));
        assert_eq!(h.engine.pending_refund_of(&h.payer), amt(15));
        // Sale itself stands
        assert_eq!(h.bank.balance_of(&h.organizer), amt(36));
        // Custody backs the retained fee plus the parked excess
        assert_eq!(h.bank.custody_balance(), amt(19));
    }

    #[test]
    fn test_process_refund_accumulates() {
        let h = harness(100);

        assert_eq!(
            h.engine.process_refund(&h.payer, amt(7), &h.issuer).unwrap(),
            amt(7)
        );
        assert_eq!(
            h.engine.process_refund(&h.payer, amt(3), &h.issuer).unwrap(),
            amt(10)
        );
        assert_eq!(h.engine.pending_refund_of(&h.payer), amt(10));

        let err = h
            .engine
            .process_refund(&h.payer, amt(0), &h.issuer)
            .unwrap_err();
        assert_eq!(err, Error::InvalidRefundAmount);

        let err = h
            .engine
            .process_refund(&AccountId::null(), amt(1), &h.issuer)
            .unwrap_err();
        assert_eq!(err, Error::InvalidRecipient);
    }

    /// Bank wrapper that re-enters the engine from inside a transfer
    struct ReentrantBank {
        inner: SettlementBank,
        engine: Mutex<Option<Arc<PaymentEngine>>>,
        admin: AccountId,
        observed: Mutex<Option<Error>>,
    }

    impl ValueTransfer for ReentrantBank {
        fn collect(&self, from: &AccountId, amount: Amount) -> bool {
            self.inner.collect(from, amount)
        }

        fn transfer(&self, to: &AccountId, amount: Amount) -> bool {
            if let Some(engine) = self.engine.lock().as_ref() {
                let err = engine.withdraw_fees(&self.admin).unwrap_err();
                *self.observed.lock() = Some(err);
            }
            self.inner.transfer(to, amount)
        }
    }

    #[test]
    fn test_reentrant_call_rejected() {
        let admin = AccountId::new("root");
        let issuer = AccountId::new("ticket-engine");
        let payer = AccountId::new("alice");
        let organizer = AccountId::new("organizer-1");

        let access = Arc::new(AccessControl::with_admin(admin.clone()));
        access
            .grant_role(Role::TicketIssuer, issuer.clone(), &admin)
            .unwrap();

        let bank = Arc::new(ReentrantBank {
            inner: SettlementBank::new(),
            engine: Mutex::new(None),
            admin: admin.clone(),
            observed: Mutex::new(None),
        });
        bank.inner.deposit(&payer, amt(100));

        let pause = Arc::new(PauseSwitch::new(access.clone()));
        let bus = Arc::new(NotificationBus::new(64));
        let engine = Arc::new(
            PaymentEngine::new(Config::default(), bank.clone(), access, pause, bus).unwrap(),
        );
        *bank.engine.lock() = Some(engine.clone());

        engine
            .process_primary_purchase(&organizer, amt(40), amt(40), &payer, &issuer)
            .unwrap();

        assert_eq!(*bank.observed.lock(), Some(Error::ReentrantCall));
    }
}
