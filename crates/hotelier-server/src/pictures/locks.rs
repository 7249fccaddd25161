//! Per-hotel critical sections.

use std::sync::Arc;

use dashmap::DashMap;
use hotelier_core::HotelId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per hotel, created on first use and dropped with the
/// last guard nobody else waits behind.
///
/// Mutations of a hotel's gallery hold its guard for their whole duration,
/// blob I/O included. Different hotels never contend.
#[derive(Debug, Default)]
pub struct HotelLocks {
    inner: DashMap<HotelId, Arc<Mutex<()>>>,
}

impl HotelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `hotel_id`.
    pub async fn acquire(&self, hotel_id: HotelId) -> HotelGuard<'_> {
        let lock = self.inner.entry(hotel_id).or_default().clone();
        HotelGuard {
            locks: self,
            hotel_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one hotel. Dropping it evicts the hotel's entry
/// when no other task holds or waits on it.
#[derive(Debug)]
pub struct HotelGuard<'a> {
    locks: &'a HotelLocks,
    hotel_id: HotelId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for HotelGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // `acquire` clones under the shard lock, so a count of one here
        // means the map holds the only reference.
        self.locks
            .inner
            .remove_if(&self.hotel_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
