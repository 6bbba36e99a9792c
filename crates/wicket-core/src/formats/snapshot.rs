//! Binary cache snapshots.
//!
//! Layout:
//!
//! ```text
//! +-------+---------+---------------+----------------+------------------+
//! | magic | version | checksum kind | checksum (32B) | postcard payload |
//! | WCKT  |   u8    |      u8       |                |                  |
//! +-------+---------+---------------+----------------+------------------+
//! ```
//!
//! The checksum is BLAKE3 over the payload when the `crypto-hash` feature
//! is enabled, and all zeroes (kind 0) otherwise. A build without the
//! feature refuses BLAKE3-tagged snapshots rather than trusting them.

use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};

/// Magic bytes at the start of every snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"WCKT";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Header length in bytes.
pub const HEADER_LEN: usize = 4 + 1 + 1 + 32;

const CHECKSUM_NONE: u8 = 0;
const CHECKSUM_BLAKE3: u8 = 1;

// =============================================================================
// SNAPSHOT TYPES
// =============================================================================

/// One memoized response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub response: String,
}

/// Portable copy of a memo table.
///
/// Entries are sorted by key and keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl CacheSnapshot {
    /// Build a snapshot from key/response pairs. Entries are sorted by key
    /// and duplicate keys keep their first response.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries: Vec<SnapshotEntry> = pairs
            .into_iter()
            .map(|(key, response)| SnapshotEntry { key, response })
            .collect();
        // Stable sort keeps the first occurrence ahead of later duplicates.
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries.dedup_by(|later, earlier| later.key == earlier.key);
        Self { entries }
    }

    /// Entries in key order.
    #[must_use]
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a response by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|e| e.key.as_str().cmp(key))
            .ok()
            .and_then(|i| self.entries.get(i))
            .map(|e| e.response.as_str())
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Encode a snapshot into its binary envelope.
pub fn encode(snapshot: &CacheSnapshot) -> Result<Vec<u8>, SnapshotError> {
    let payload = postcard::to_allocvec(snapshot)?;
    let (kind, checksum) = checksum(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_VERSION);
    out.push(kind);
    out.extend_from_slice(&checksum);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a binary envelope, validating magic, version and checksum.
pub fn decode(bytes: &[u8]) -> Result<CacheSnapshot, SnapshotError> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Truncated(bytes.len()));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);

    if header[..4] != SNAPSHOT_MAGIC {
        return Err(SnapshotError::InvalidMagic);
    }
    let version = header[4];
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    let kind = header[5];
    let stored = &header[6..HEADER_LEN];
    verify(kind, stored, payload)?;

    // The payload may come from another writer; restore key order.
    let decoded: CacheSnapshot = postcard::from_bytes(payload)?;
    Ok(CacheSnapshot::from_pairs(
        decoded.entries.into_iter().map(|e| (e.key, e.response)),
    ))
}

#[cfg(feature = "crypto-hash")]
fn checksum(payload: &[u8]) -> (u8, [u8; 32]) {
    (CHECKSUM_BLAKE3, *blake3::hash(payload).as_bytes())
}

#[cfg(not(feature = "crypto-hash"))]
fn checksum(_payload: &[u8]) -> (u8, [u8; 32]) {
    (CHECKSUM_NONE, [0u8; 32])
}

fn verify(kind: u8, stored: &[u8], payload: &[u8]) -> Result<(), SnapshotError> {
    match kind {
        CHECKSUM_NONE => Ok(()),
        CHECKSUM_BLAKE3 => verify_blake3(stored, payload),
        _ => Err(SnapshotError::ChecksumMismatch),
    }
}

#[cfg(feature = "crypto-hash")]
fn verify_blake3(stored: &[u8], payload: &[u8]) -> Result<(), SnapshotError> {
    if blake3::hash(payload).as_bytes().as_slice() == stored {
        Ok(())
    } else {
        Err(SnapshotError::ChecksumMismatch)
    }
}

#[cfg(not(feature = "crypto-hash"))]
fn verify_blake3(_stored: &[u8], _payload: &[u8]) -> Result<(), SnapshotError> {
    tracing::warn!("snapshot carries a BLAKE3 checksum but crypto-hash is disabled");
    Err(SnapshotError::UnverifiableChecksum)
}

// =============================================================================
// TESTS
// =============================================================================
