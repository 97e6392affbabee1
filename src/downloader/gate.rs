//! Optional mutual exclusion around fetcher calls.
//!
//! The external fetcher appends to a shared completion ledger and writes into
//! a shared output directory. Under [`FetchPolicy::Serialized`] the gate is a
//! single-permit semaphore so at most one fetch runs at a time; under
//! [`FetchPolicy::Parallel`] acquiring always succeeds immediately.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::FetchPolicy;

/// Process-wide fetch gate (cheap to clone; clones share the same permit)
#[derive(Clone, Debug)]
pub struct FetchGate {
    permits: Option<Arc<Semaphore>>,
}

/// Held for the duration of one fetch; dropping it releases the gate
#[derive(Debug)]
pub struct FetchPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl FetchGate {
    /// Build a gate for the given policy
    pub fn new(policy: FetchPolicy) -> Self {
        let permits = match policy {
            FetchPolicy::Serialized => Some(Arc::new(Semaphore::new(1))),
            FetchPolicy::Parallel => None,
        };
        Self { permits }
    }

    /// Policy this gate enforces
    pub fn policy(&self) -> FetchPolicy {
        if self.permits.is_some() {
            FetchPolicy::Serialized
        } else {
            FetchPolicy::Parallel
        }
    }

    /// Wait until this caller may run a fetch
    pub async fn acquire(&self) -> FetchPermit {
        let Some(permits) = &self.permits else {
            return FetchPermit { _permit: None };
        };

        match permits.clone().acquire_owned().await {
            Ok(permit) => FetchPermit {
                _permit: Some(permit),
            },
            Err(e) => {
                // The semaphore is never closed, so this only happens if that changes
                tracing::warn!(error = %e, "Fetch gate closed; running fetch ungated");
                FetchPermit { _permit: None }
            }
        }
    }
}
