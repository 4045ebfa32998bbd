//! Per-identity mutual exclusion.
//!
//! Every session flow is a read-modify-write on one user row. Events for
//! distinct users may run concurrently, but two events for the same user
//! (say a duplicate upload notification racing a withdrawal request) must
//! not interleave between the read and the final put. Handlers take the
//! user's mutex here before the read and hold it until after the put.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per user id.
///
/// Entries are created on first contact and kept for the process lifetime;
/// a mutex is a few dozen bytes, so the registry stays small even with a
/// large user base.
#[derive(Default)]
pub struct UserLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the mutex for one user id, waiting if another event for the
    /// same id is mid-flow. Guards for different ids never contend.
    pub async fn acquire(&self, telegram_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(telegram_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
