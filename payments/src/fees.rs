//! Platform fee arithmetic
//!
//! Fees are expressed in parts-per-mille of the nominal price and always
//! round down, so the recipient credit plus the retained fee reconstructs the
//! nominal price exactly.

use platform::Amount;
use rust_decimal::Decimal;

/// Fee rates are parts-per-mille: rate / 1000 of the nominal price
pub const FEE_DENOMINATOR: u32 = 1000;

/// Hard ceiling on the configurable fee rate (100 ppm = 10%)
pub const MAX_FEE_RATE_PPM: u32 = 100;

/// Platform fee retained on a sale: `floor(nominal * rate / 1000)`
pub fn platform_fee(nominal: Amount, rate_ppm: u32) -> Amount {
    (nominal * Decimal::from(rate_ppm) / Decimal::from(FEE_DENOMINATOR)).floor()
}
