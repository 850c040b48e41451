//! Error types for platform services

use crate::access::Role;
use crate::types::AccountId;
use thiserror::Error;

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Platform errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Authorization denied by the access-control policy
    #[error("access denied: account '{account}' does not hold role {role}")]
    AccessDenied {
        /// Role the operation required
        role: Role,
        /// Account that was checked
        account: AccountId,
    },
}
