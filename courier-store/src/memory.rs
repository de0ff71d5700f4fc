use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use courier_booking::models::{Booking, BookingRequest, Trip};
use courier_wallet::EscrowLedger;

use crate::app_config::BusinessRules;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: lock acquisition timed out")]
    Unavailable,
}

/// Everything the durable store holds. Cloneable so a transaction can stage
/// its changes and throw them away on failure.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub trips: HashMap<Uuid, Trip>,
    pub requests: HashMap<Uuid, BookingRequest>,
    pub bookings: HashMap<Uuid, Booking>,
    pub escrow: EscrowLedger,
}

/// In-memory stand-in for the relational store.
///
/// Transactions are serializable: a single async mutex orders them, and each
/// one mutates a staged clone that only replaces the live state when the
/// closure returns `Ok`. An `Err` rolls everything back, which is what makes
/// the acceptance path all-or-nothing.
#[derive(Clone)]
pub struct MemStore {
    inner: Arc<Mutex<StoreState>>,
    lock_timeout: Duration,
    retry_attempts: u32,
}

impl MemStore {
    pub fn new(rules: &BusinessRules) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreState::default())),
            lock_timeout: Duration::from_millis(rules.tx_lock_timeout_ms),
            retry_attempts: rules.tx_retry_attempts,
        }
    }

    /// Acquire the state lock, retrying a bounded number of times before
    /// surfacing `Unavailable`. Lock contention is the only infrastructure
    /// failure this store can produce.
    async fn acquire(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        for attempt in 0..=self.retry_attempts {
            match tokio::time::timeout(self.lock_timeout, self.inner.lock()).await {
                Ok(guard) => return Ok(guard),
                Err(_) => {
                    tracing::warn!(attempt, "store lock acquisition timed out, retrying");
                }
            }
        }
        Err(StoreError::Unavailable)
    }

    /// Run a serializable transaction.
    ///
    /// The closure sees a staged copy of the state; its changes become
    /// durably visible together iff it returns `Ok`. The outer error is
    /// infrastructure (`Unavailable`), the inner one is the business result.
    pub async fn transaction<T, E, F>(&self, f: F) -> Result<Result<T, E>, StoreError>
    where
        F: FnOnce(&mut StoreState) -> Result<T, E>,
    {
        let mut guard = self.acquire().await?;
        let mut staged = guard.clone();
        match f(&mut staged) {
            Ok(value) => {
                *guard = staged;
                Ok(Ok(value))
            }
            Err(e) => Ok(Err(e)),
        }
    }

    /// Run a read against a consistent snapshot of the state.
    pub async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&StoreState) -> T,
    {
        let guard = self.acquire().await?;
        Ok(f(&guard))
    }
}
