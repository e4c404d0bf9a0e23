//! Per-(user, key) write serialisation.
//!
//! The store is last-write-wins with no merging, so two overlapping
//! read-modify-write cycles on the same key would lose one update. Services
//! hold the matching guard from load to save.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::storage::StoreKey;

#[derive(Clone, Default)]
pub struct KeyedWriteLocks {
    locks: Arc<Mutex<HashMap<(String, StoreKey), Arc<AsyncMutex<()>>>>>,
}

impl KeyedWriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `(user_id, key)`; waiters are served in arrival order
    pub async fn acquire(&self, user_id: &str, key: StoreKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks
                .entry((user_id.to_string(), key))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyedWriteLocks::new();
        let guard = locks.acquire("u1", StoreKey::MoodHistory).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire("u1", StoreKey::MoodHistory).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedWriteLocks::new();
        let _mood = locks.acquire("u1", StoreKey::MoodHistory).await;
        let _chat = locks.acquire("u1", StoreKey::ChatHistory).await;
        let _other_user = locks.acquire("u2", StoreKey::MoodHistory).await;
    }
}
