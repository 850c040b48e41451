//! Role-based access control
//!
//! An explicit authorization-policy component: every gated operation asks for
//! a typed decision at its top instead of scattering capability checks.
//! Grants live in an in-process registry; wiring happens at construction time.

use crate::error::{Error, Result};
use crate::types::AccountId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Roles recognized by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Platform administrator: pause switch, role grants, fee withdrawal
    Admin,
    /// May change the platform fee rate
    FeeManager,
    /// May create and manage events
    Organizer,
    /// The ticket engine's service identity; the only caller the payment
    /// engine accepts for purchase and refund processing
    TicketIssuer,
}

impl Role {
    /// Stable name used in logs and notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::FeeManager => "fee-manager",
            Role::Organizer => "organizer",
            Role::TicketIssuer => "ticket-issuer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed authorization decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The account holds the required role
    Permit,
    /// The account does not hold the required role
    Deny {
        /// Role that was required
        role: Role,
        /// Account that was checked
        account: AccountId,
    },
}

impl Decision {
    /// True when the decision permits the operation
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }
}

/// Role registry queried at the top of every gated operation
pub struct AccessControl {
    grants: DashMap<Role, HashSet<AccountId>>,
}

impl AccessControl {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            grants: DashMap::new(),
        }
    }

    /// Create a registry with an initial admin account
    pub fn with_admin(admin: AccountId) -> Self {
        let access = Self::new();
        access
            .grants
            .entry(Role::Admin)
            .or_default()
            .insert(admin);
        access
    }

    /// Check whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.grants
            .get(&role)
            .map(|holders| holders.contains(account))
            .unwrap_or(false)
    }

    /// Evaluate the policy for `account` against `role`
    pub fn authorize(&self, role: Role, account: &AccountId) -> Decision {
        if self.has_role(role, account) {
            Decision::Permit
        } else {
            Decision::Deny {
                role,
                account: account.clone(),
            }
        }
    }

    /// Require `role`, converting a denial into an error
    pub fn require(&self, role: Role, account: &AccountId) -> Result<()> {
        match self.authorize(role, account) {
            Decision::Permit => Ok(()),
            Decision::Deny { role, account } => Err(Error::AccessDenied { role, account }),
        }
    }

    /// Grant `role` to `account`; only admins may grant
    pub fn grant_role(&self, role: Role, account: AccountId, caller: &AccountId) -> Result<()> {
        self.require(Role::Admin, caller)?;
        self.grants.entry(role).or_default().insert(account.clone());
        tracing::info!(%role, %account, "role granted");
        Ok(())
    }

    /// Revoke `role` from `account`; only admins may revoke
    pub fn revoke_role(&self, role: Role, account: &AccountId, caller: &AccountId) -> Result<()> {
        self.require(Role::Admin, caller)?;
        if let Some(mut holders) = self.grants.get_mut(&role) {
            holders.remove(account);
        }
        tracing::info!(%role, %account, "role revoked");
        Ok(())
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_admin() {
        let admin = AccountId::new("root");
        let access = AccessControl::with_admin(admin.clone());
        assert!(access.has_role(Role::Admin, &admin));
        assert!(!access.has_role(Role::FeeManager, &admin));
    }

    #[test]
    fn test_grant_requires_admin() {
        let admin = AccountId::new("root");
        let outsider = AccountId::new("mallory");
        let access = AccessControl::with_admin(admin.clone());

        let result = access.grant_role(Role::Organizer, outsider.clone(), &outsider);
        assert!(result.is_err());

        access
            .grant_role(Role::Organizer, outsider.clone(), &admin)
            .unwrap();
        assert!(access.has_role(Role::Organizer, &outsider));
    }

    #[test]
    fn test_revoke() {
        let admin = AccountId::new("root");
        let org = AccountId::new("organizer-1");
        let access = AccessControl::with_admin(admin.clone());

        access
            .grant_role(Role::Organizer, org.clone(), &admin)
            .unwrap();
        access.revoke_role(Role::Organizer, &org, &admin).unwrap();
        assert!(!access.has_role(Role::Organizer, &org));
    }

    #[test]
    fn test_typed_decision() {
        let access = AccessControl::new();
        let account = AccountId::new("alice");
        let decision = access.authorize(Role::FeeManager, &account);
        assert!(!decision.is_permit());
        match decision {
            Decision::Deny { role, account } => {
                assert_eq!(role, Role::FeeManager);
                assert_eq!(account.as_str(), "alice");
            }
            Decision::Permit => panic!("expected deny"),
        }
    }
}
