//! In-memory implementation of the KvStore trait.
//!
//! Same ordering semantics as SQLite, no persistence. Used for tests and as
//! the snapshot type of simulation runs.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use certreg_core::KvPair;

use crate::error::{Result, StoreError};
use crate::traits::KvStore;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<Vec<u8>, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding exactly `pairs`.
    pub fn from_pairs(pairs: impl IntoIterator<Item = KvPair>) -> Self {
        let map = pairs
            .into_iter()
            .map(|pair| (pair.key.to_vec(), pair.value))
            .collect();
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(key).cloned())
    }

    async fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(key.to_vec(), Bytes::copy_from_slice(value));
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.remove(key);
        Ok(())
    }

    async fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>> {
        if matches!(end, Some(end) if end <= start) {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().map_err(poisoned)?;
        let upper = end.map_or(Bound::Unbounded, Bound::Excluded);
        Ok(inner
            .range::<[u8], _>((Bound::Included(start), upper))
            .map(|(k, v)| KvPair::new(Bytes::copy_from_slice(k), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certreg_core::{certificate_key, next_certificate_id_key, KeyPrefix};

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        store.set(b"\x00a", b"one").await.unwrap();

        assert_eq!(store.get(b"\x00a").await.unwrap(), Some(Bytes::from_static(b"one")));
        assert!(store.has(b"\x00a").await.unwrap());

        store.delete(b"\x00a").await.unwrap();
        assert_eq!(store.get(b"\x00a").await.unwrap(), None);

        // Deleting again is fine.
        store.delete(b"\x00a").await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_prefix_isolates_kinds() {
        let store = MemoryStore::new();
        store.set(&certificate_key(2), b"b").await.unwrap();
        store.set(&certificate_key(1), b"a").await.unwrap();
        store.set(&next_certificate_id_key(), b"n").await.unwrap();
        store.set(&[0x04, 0xff], b"reserved").await.unwrap();

        let certs = store.scan_prefix(KeyPrefix::Certificate).await.unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].key.as_ref(), certificate_key(1).as_slice());
        assert_eq!(certs[1].key.as_ref(), certificate_key(2).as_slice());

        let counter = store.scan_prefix(KeyPrefix::NextCertificateId).await.unwrap();
        assert_eq!(counter.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_range() {
        let store = MemoryStore::from_pairs([KvPair::new(vec![1u8], vec![1u8])]);
        assert!(store.range(&[2], Some(&[1u8][..])).await.unwrap().is_empty());
        assert!(store.range(&[1], Some(&[1u8][..])).await.unwrap().is_empty());
        assert_eq!(store.snapshot().await.unwrap().len(), 1);
    }

    #[test]
    fn test_poisoned_lock_surfaces_in_len() {
        let store = MemoryStore::from_pairs([KvPair::new(vec![1u8], vec![1u8])]);
        assert_eq!(store.len().unwrap(), 1);

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.inner.write().unwrap();
            panic!("writer died holding the lock");
        }));

        assert!(matches!(store.len(), Err(StoreError::Poisoned(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Poisoned(_))));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn block_on<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(future)
        }

        proptest! {
            #[test]
            fn scan_prefix_returns_exactly_one_kind(
                keys in proptest::collection::btree_set(proptest::collection::vec(0u8..12, 1..6), 0..32),
                kind in proptest::sample::select(KeyPrefix::ALL.to_vec()),
            ) {
                let store = MemoryStore::from_pairs(
                    keys.iter().map(|key| KvPair::new(key.clone(), Vec::<u8>::new())),
                );
                let scanned = block_on(store.scan_prefix(kind)).unwrap();

                let expected: Vec<&Vec<u8>> =
                    keys.iter().filter(|key| key[0] == kind.as_byte()).collect();
                prop_assert_eq!(scanned.len(), expected.len());
                for (pair, key) in scanned.iter().zip(expected) {
                    prop_assert_eq!(pair.key.as_ref(), key.as_slice());
                }
            }
        }
    }
}
