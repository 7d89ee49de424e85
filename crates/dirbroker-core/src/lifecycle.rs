//! Per-instance lifecycle
//!
//! `Unprovisioned → Provisioned` on provision. Re-provisioning and binding
//! keep an instance `Provisioned`. There is no deprovision transition here.

use crate::types::URI_KEY;
use dirbroker_store::CredentialMap;

/// Whether an instance has a stored location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    /// No location stored yet
    Unprovisioned,
    /// A location is stored under the reserved key
    Provisioned,
}

impl InstanceState {
    /// State implied by the mapping stored for an instance
    #[inline]
    #[must_use]
    pub fn of(stored: &CredentialMap) -> Self {
        if stored.contains_key(URI_KEY) {
            Self::Provisioned
        } else {
            Self::Unprovisioned
        }
    }
}

/// Plan operation applied to an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Attach a location
    Provision,
    /// Hand out credentials
    Bind,
}

/// Lifecycle violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// `op` is not in [`allowed_operations`] for `from`
    #[error("{op:?} is not valid in state {from:?}")]
    IllegalOperation { from: InstanceState, op: Operation },
}

/// Operations valid in `from`
#[must_use]
pub fn allowed_operations(from: InstanceState) -> Vec<Operation> {
    match from {
        InstanceState::Unprovisioned => vec![Operation::Provision],
        InstanceState::Provisioned => vec![Operation::Provision, Operation::Bind],
    }
}

/// State after applying `op` in `from`
///
/// # Errors
/// [`LifecycleError::IllegalOperation`] if `op` is not allowed in `from`
pub fn next_state(from: InstanceState, op: Operation) -> Result<InstanceState, LifecycleError> {
    if allowed_operations(from).contains(&op) {
        Ok(InstanceState::Provisioned)
    } else {
        Err(LifecycleError::IllegalOperation { from, op })
    }
}
