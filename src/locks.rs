use std::hash::Hash;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::prelude::*;

/// Per-key async mutexes, used to serialize read-modify-write sequences
/// against the same row group.
pub struct KeyedLocks<K> {
  inner: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
  pub fn new() -> Self {
    Self { inner: DashMap::new() }
  }

  pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
    // Clone the mutex out so the shard guard is released before awaiting.
    let mutex = self.inner.entry(key.clone()).or_default().clone();
    mutex.lock_owned().await
  }

  /// Drops entries nobody is holding or waiting on.
  pub fn gc(&self) -> usize {
    let before = self.inner.len();
    self.inner.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    before - self.inner.len()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.inner.len()
  }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
  fn default() -> Self {
    Self::new()
  }
}
