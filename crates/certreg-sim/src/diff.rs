//! Snapshot comparison.
//!
//! Pairs up entries from two snapshots by identical key, skips entries
//! whose values are byte-identical, and renders every mismatch through a
//! [`StoreDecoder`]. Keys present on one side only are reported raw.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use certreg_core::{Codec, KeyPrefix, KvPair};
use certreg_store::KvStore;

use crate::decoder::StoreDecoder;
use crate::error::{DecodeError, Result};

/// Configuration for a comparison run.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Stop at the first pair that fails to decode.
    ///
    /// When false, the failure is recorded as [`DiffEntry::Undecodable`]
    /// and the run continues.
    pub abort_on_decode_error: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            abort_on_decode_error: true,
        }
    }
}

/// One difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffEntry {
    /// Both snapshots hold the key with different values.
    Mismatch {
        prefix: KeyPrefix,
        key: Bytes,
        /// Decoded values, A on the first line and B on the second.
        rendering: String,
    },
    /// Only snapshot A holds the key.
    OnlyInA(KvPair),
    /// Only snapshot B holds the key.
    OnlyInB(KvPair),
    /// The values differ and could not be decoded.
    Undecodable { key: Bytes, error: DecodeError },
}

impl DiffEntry {
    /// The store key this entry is about.
    pub fn key(&self) -> &Bytes {
        match self {
            DiffEntry::Mismatch { key, .. } | DiffEntry::Undecodable { key, .. } => key,
            DiffEntry::OnlyInA(pair) | DiffEntry::OnlyInB(pair) => &pair.key,
        }
    }
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreDiff {
    /// Differences, ordered by key.
    pub entries: Vec<DiffEntry>,
    /// Number of keys present in both snapshots.
    pub compared: usize,
}

impl StoreDiff {
    /// Check if the snapshots hold identical data.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries decoded as mismatching values.
    pub fn mismatches(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, DiffEntry::Mismatch { .. }))
    }

    /// Entries that failed to decode.
    pub fn undecodable(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, DiffEntry::Undecodable { .. }))
    }
}

impl fmt::Display for StoreDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                DiffEntry::Mismatch {
                    prefix,
                    key,
                    rendering,
                } => {
                    writeln!(f, "{} {}:", prefix, hex::encode(key))?;
                    for line in rendering.lines() {
                        writeln!(f, "  {line}")?;
                    }
                }
                DiffEntry::OnlyInA(pair) => writeln!(f, "only in A: {pair:?}")?,
                DiffEntry::OnlyInB(pair) => writeln!(f, "only in B: {pair:?}")?,
                DiffEntry::Undecodable { key, error } => {
                    writeln!(f, "undecodable {}: {}", hex::encode(key), error)?
                }
            }
        }
        Ok(())
    }
}

/// Compare two snapshots entry by entry.
///
/// With the default config the first decode failure is returned.
pub fn diff_snapshots<C: Codec>(
    decoder: &StoreDecoder<C>,
    a: &[KvPair],
    b: &[KvPair],
    config: &DiffConfig,
) -> std::result::Result<StoreDiff, DecodeError> {
    let a: BTreeMap<&[u8], &KvPair> = a.iter().map(|pair| (pair.key.as_ref(), pair)).collect();
    let mut b: BTreeMap<&[u8], &KvPair> =
        b.iter().map(|pair| (pair.key.as_ref(), pair)).collect();

    let mut diff = StoreDiff::default();
    for (key, kv_a) in a {
        let Some(kv_b) = b.remove(key) else {
            diff.entries.push(DiffEntry::OnlyInA(kv_a.clone()));
            continue;
        };
        diff.compared += 1;
        if kv_a.value == kv_b.value {
            continue;
        }

        let decoded = KeyPrefix::of_key(key)
            .map_err(DecodeError::from)
            .and_then(|prefix| Ok((prefix, decoder.decode_pair(kv_a, kv_b)?)));
        match decoded {
            Ok((prefix, rendering)) => diff.entries.push(DiffEntry::Mismatch {
                prefix,
                key: kv_a.key.clone(),
                rendering,
            }),
            Err(error) if !config.abort_on_decode_error => {
                tracing::warn!(key = %hex::encode(key), %error, "undecodable store entry");
                diff.entries.push(DiffEntry::Undecodable {
                    key: kv_a.key.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }
    diff.entries
        .extend(b.into_values().map(|pair| DiffEntry::OnlyInB(pair.clone())));
    diff.entries.sort_by(|x, y| x.key().cmp(y.key()));

    Ok(diff)
}

/// Snapshot two stores and compare them.
pub async fn diff_stores<C, A, B>(
    decoder: &StoreDecoder<C>,
    a: &A,
    b: &B,
    config: &DiffConfig,
) -> Result<StoreDiff>
where
    C: Codec,
    A: KvStore,
    B: KvStore,
{
    let snapshot_a = a.snapshot().await?;
    let snapshot_b = b.snapshot().await?;
    let diff = diff_snapshots(decoder, &snapshot_a, &snapshot_b, config)?;

    tracing::debug!(
        compared = diff.compared,
        differences = diff.len(),
        "compared store snapshots"
    );
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use certreg_core::{
        certifier_cert_ids_key, encode_id, encode_id_list, next_certificate_id_key, Address,
    };
    use certreg_store::MemoryStore;

    fn ids_pair(owner: u8, ids: &[u64]) -> KvPair {
        KvPair::new(
            certifier_cert_ids_key(&Address::from_bytes([owner; 20])),
            encode_id_list(ids),
        )
    }

    fn decoder() -> StoreDecoder {
        StoreDecoder::default()
    }

    fn counter(id: u64) -> KvPair {
        KvPair::new(next_certificate_id_key(), encode_id(id).to_vec())
    }

    #[test]
    fn test_identical_snapshots() {
        let snapshot = vec![counter(3), ids_pair(1, &[1, 2])];
        let diff =
            diff_snapshots(&decoder(), &snapshot, &snapshot, &DiffConfig::default())
                .unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.compared, 2);
    }

    #[test]
    fn test_mismatch_and_one_sided_keys() {
        let a = vec![counter(3), ids_pair(1, &[1, 2])];
        let b = vec![counter(4), ids_pair(2, &[1])];
        let diff =
            diff_snapshots(&decoder(), &a, &b, &DiffConfig::default()).unwrap();

        assert_eq!(diff.compared, 1);
        assert_eq!(diff.len(), 3);
        assert_eq!(
            diff.entries[0],
            DiffEntry::Mismatch {
                prefix: KeyPrefix::NextCertificateId,
                key: Bytes::from(next_certificate_id_key()),
                rendering: "3\n4".into(),
            }
        );
        assert_eq!(diff.entries[1], DiffEntry::OnlyInA(ids_pair(1, &[1, 2])));
        assert_eq!(diff.entries[2], DiffEntry::OnlyInB(ids_pair(2, &[1])));

        let report = diff.to_string();
        assert!(report.contains("next certificate id (0x08)"));
        assert!(report.contains("only in A"));
    }

    #[test]
    fn test_decode_failure_aborts_by_default() {
        let a = vec![KvPair::new(vec![0xFFu8], vec![1u8])];
        let b = vec![KvPair::new(vec![0xFFu8], vec![2u8])];
        let result = diff_snapshots(&decoder(), &a, &b, &DiffConfig::default());
        assert_eq!(result, Err(DecodeError::UnknownPrefix(0xFF)));
    }

    #[test]
    fn test_decode_failure_recorded_when_tolerated() {
        let a = vec![KvPair::new(vec![0xFFu8], vec![1u8]), counter(1)];
        let b = vec![KvPair::new(vec![0xFFu8], vec![2u8]), counter(2)];
        let config = DiffConfig {
            abort_on_decode_error: false,
        };
        let diff = diff_snapshots(&decoder(), &a, &b, &config).unwrap();

        assert_eq!(diff.mismatches().count(), 1);
        assert_eq!(diff.undecodable().count(), 1);
    }

    #[test]
    fn test_equal_bytes_are_not_decoded() {
        // Identical garbage under an unknown prefix is not a difference.
        let a = vec![KvPair::new(vec![0xFFu8], vec![1u8])];
        let diff =
            diff_snapshots(&decoder(), &a, &a, &DiffConfig::default()).unwrap();
        assert!(diff.is_empty());
    }

    #[tokio::test]
    async fn test_diff_stores() {
        let a = MemoryStore::from_pairs([counter(1), ids_pair(1, &[3, 7, 42])]);
        let b = MemoryStore::from_pairs([counter(1), ids_pair(1, &[3, 7])]);

        let diff = diff_stores(&decoder(), &a, &b, &DiffConfig::default())
            .await
            .unwrap();
        assert_eq!(diff.len(), 1);
        match &diff.entries[0] {
            DiffEntry::Mismatch { rendering, .. } => {
                assert_eq!(rendering, "[3, 7, 42]\n[3, 7]")
            }
            other => panic!("unexpected entry: {other:?}"),
        }
    }
}
