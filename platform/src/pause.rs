//! System-wide pause switch
//!
//! A single flag consulted by every money-moving operation. Toggling is
//! admin-gated; reads are lock-free.

use crate::access::{AccessControl, Role};
use crate::error::Result;
use crate::types::AccountId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Admin-gated halt switch
pub struct PauseSwitch {
    paused: AtomicBool,
    access: Arc<AccessControl>,
}

impl PauseSwitch {
    /// Create an unpaused switch bound to an access-control policy
    pub fn new(access: Arc<AccessControl>) -> Self {
        Self {
            paused: AtomicBool::new(false),
            access,
        }
    }

    /// True while the system is paused
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Halt money-moving operations; admin only
    pub fn pause(&self, caller: &AccountId) -> Result<()> {
        self.access.require(Role::Admin, caller)?;
        self.paused.store(true, Ordering::SeqCst);
        tracing::warn!(%caller, "system paused");
        Ok(())
    }

    /// Resume money-moving operations; admin only
    pub fn unpause(&self, caller: &AccountId) -> Result<()> {
        self.access.require(Role::Admin, caller)?;
        self.paused.store(false, Ordering::SeqCst);
        tracing::info!(%caller, "system unpaused");
        Ok(())
    }
}
