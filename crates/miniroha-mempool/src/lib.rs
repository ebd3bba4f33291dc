//! Pending-transaction pool (`spec.md` §4.5). Owned by a single node; not
//! externally concurrent.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use miniroha_core::{MinirohaError, Nonce, Transaction};
use miniroha_crypto::hash_canonical;

const DEFAULT_MAX_SIZE: usize = 10_000;

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Clone)]
struct Entry {
    tx: Transaction,
    hash: String,
    seq: u64,
}

/// A capacity-bounded, nonce-ordered pool of validated transactions.
pub struct Mempool {
    max_size: usize,
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

impl Mempool {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn conflicts(&self, signer_id: &str, nonce: Nonce) -> bool {
        self.entries
            .values()
            .any(|e| e.tx.body.signer_id.as_str() == signer_id && e.tx.body.nonce == nonce)
    }

    /// Entry at the front of the nonce-sorted sequence — the eviction
    /// candidate when the pool is at capacity.
    fn oldest_key(&self) -> Option<String> {
        self.entries
            .values()
            .min_by_key(|e| (e.tx.body.nonce, e.seq))
            .map(|e| e.hash.clone())
    }

    /// Insert a validated transaction. Rejects an identical hash already
    /// present, and any transaction whose `(signer_id, nonce)` matches a
    /// pending entry. At capacity, evicts the oldest entry to make room.
    pub fn insert(&mut self, tx: Transaction) -> Result<String, MinirohaError> {
        let hash = hash_canonical(&tx).map_err(|e| MinirohaError::Serialization(e.to_string()))?;
        if self.entries.contains_key(&hash) {
            return Err(MinirohaError::AlreadyExists(hash));
        }
        if self.conflicts(tx.body.signer_id.as_str(), tx.body.nonce) {
            return Err(MinirohaError::AlreadyExists(format!(
                "{}:{}",
                tx.body.signer_id, tx.body.nonce
            )));
        }
        if self.entries.len() >= self.max_size {
            if let Some(evict) = self.oldest_key() {
                self.entries.remove(&evict);
            }
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            hash.clone(),
            Entry {
                tx,
                hash: hash.clone(),
                seq,
            },
        );
        Ok(hash)
    }

    /// The pool in delivery order: ascending `nonce`, ties broken by
    /// insertion order (`spec.md` §4.5 "Ordering").
    fn ordered(&self) -> Vec<&Entry> {
        let mut v: Vec<&Entry> = self.entries.values().collect();
        v.sort_by_key(|e| (e.tx.body.nonce, e.seq));
        v
    }

    /// A prefix of the ordered sequence subject to both caps. Does not
    /// remove anything.
    pub fn take_for_block(&self, max_count: usize, max_bytes: usize) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut bytes = 0usize;
        for entry in self.ordered() {
            if out.len() >= max_count {
                break;
            }
            let size = serde_json::to_vec(&entry.tx).map(|v| v.len()).unwrap_or(0);
            if bytes + size > max_bytes && !out.is_empty() {
                break;
            }
            bytes += size;
            out.push(entry.tx.clone());
        }
        out
    }

    pub fn remove_committed(&mut self, hashes: &[String]) {
        for h in hashes {
            self.entries.remove(h);
        }
    }

    /// Remove entries whose transaction `created_at` is older than
    /// `age_secs` ago (`spec.md` §4.5). Returns the number removed.
    pub fn evict_older_than(&mut self, age_secs: i64) -> usize {
        let cutoff = now_secs() - age_secs;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.tx.body.created_at > cutoff);
        before - self.entries.len()
    }
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}
