//! KvStore trait: the abstract interface for the module's key-value partition.
//!
//! Implementations include SQLite (persistent) and in-memory (for tests and
//! simulation snapshots). Keys are ordered bytewise in every backend, so a
//! range scan over `[prefix, prefix + 1)` yields exactly one record kind.

use async_trait::async_trait;
use bytes::Bytes;
use certreg_core::{KeyPrefix, KvPair};

use crate::error::Result;

/// Async interface for a raw, ordered key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &[u8]) -> Result<()>;

    /// Entries with `start <= key < end`, ordered by key.
    ///
    /// `end = None` scans to the end of the store.
    async fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>>;

    /// Check if a key exists.
    async fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// All entries of one record kind.
    async fn scan_prefix(&self, prefix: KeyPrefix) -> Result<Vec<KvPair>> {
        let start = prefix.scan_prefix();
        let end = prefix.scan_end();
        self.range(&start, Some(&end[..])).await
    }

    /// Every entry in the store, ordered by key.
    async fn snapshot(&self) -> Result<Vec<KvPair>> {
        self.range(&[], None).await
    }
}
