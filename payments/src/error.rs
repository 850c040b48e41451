//! Error types for the payment engine

use platform::{AccountId, Amount};
use thiserror::Error;

/// Result type for payment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Payment errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Money-moving operations are halted
    #[error("system paused")]
    SystemPaused,

    /// Supplied value does not cover the nominal price
    #[error("insufficient payment: supplied {supplied}, required {required}")]
    InsufficientPayment {
        /// Value supplied with the call
        supplied: Amount,
        /// Nominal price that had to be covered
        required: Amount,
    },

    /// The null account cannot receive value
    #[error("invalid recipient: the null account cannot receive value")]
    InvalidRecipient,

    /// Refund amounts must be positive
    #[error("invalid refund amount: must be positive")]
    InvalidRefundAmount,

    /// Requested fee rate is above the hard ceiling
    #[error("fee rate {rate_ppm} ppm exceeds ceiling of {ceiling} ppm")]
    FeeTooHigh {
        /// Requested rate (parts-per-mille)
        rate_ppm: u32,
        /// Enforced ceiling
        ceiling: u32,
    },

    /// Withdrawal requested with a zero accumulated balance
    #[error("no fees to withdraw")]
    NoFeesToWithdraw,

    /// The external value-transfer primitive reported failure
    #[error("value transfer of {amount} involving account '{account}' failed")]
    TransferFailed {
        /// Account on the failing side of the transfer
        account: AccountId,
        /// Amount that could not be moved
        amount: Amount,
    },

    /// A nested call re-entered an operation that holds the payment lock
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// Authorization denied
    #[error(transparent)]
    Access(#[from] platform::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
