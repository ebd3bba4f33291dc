//! The state store façade (`spec.md` §4.2): typed point-get/put/delete over
//! an embedded KV store, plus an atomic batch. The façade's one contract to
//! its callers: a batch either commits in its entirety or leaves the store
//! untouched — `sled::Batch` applied via `Tree::apply_batch` guarantees
//! exactly that.
//!
//! `spec.md` §6 mandates canonical JSON as the wire *and persisted* format,
//! so every value stored here is canonical-JSON bytes rather than bincode
//! (a deliberate divergence from the teacher repo's bincode storage — see
//! `DESIGN.md`).

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Batch, Db};

use miniroha_core::{
    Account, AccountRoles, Asset, Balance, Block, Domain, Height, MinirohaError, Nonce, Role,
    Validator,
};

use crate::keys;

fn storage_err(e: sled::Error) -> MinirohaError {
    MinirohaError::Storage(e.to_string())
}

fn ser_err(e: serde_json::Error) -> MinirohaError {
    MinirohaError::Serialization(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, MinirohaError> {
    miniroha_crypto::canonical_bytes(value).map_err(|e| MinirohaError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, MinirohaError> {
    serde_json::from_slice(bytes).map_err(ser_err)
}

/// The persistent state database. Cloning is cheap — `sled::Db` is an
/// `Arc`-backed handle — so a single store can be shared across the
/// consensus event loop and the HTTP query surface.
#[derive(Clone)]
pub struct StateStore {
    db: Db,
}

impl StateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MinirohaError> {
        let db = sled::open(path).map_err(storage_err)?;
        Ok(Self { db })
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, MinirohaError> {
        match self.db.get(key.as_bytes()).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Domains ──────────────────────────────────────────────────────────────

    pub fn get_domain(&self, id: &str) -> Result<Option<Domain>, MinirohaError> {
        self.get(&keys::domain(id))
    }

    pub fn domain_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_domain(id)?.is_some())
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn get_account(&self, id: &str) -> Result<Option<Account>, MinirohaError> {
        self.get(&keys::account(id))
    }

    pub fn account_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_account(id)?.is_some())
    }

    pub fn get_account_roles(&self, id: &str) -> Result<AccountRoles, MinirohaError> {
        Ok(self.get(&keys::account_roles(id))?.unwrap_or_default())
    }

    // ── Assets ───────────────────────────────────────────────────────────────

    pub fn get_asset(&self, id: &str) -> Result<Option<Asset>, MinirohaError> {
        self.get(&keys::asset(id))
    }

    pub fn asset_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_asset(id)?.is_some())
    }

    // ── Balances ─────────────────────────────────────────────────────────────

    /// Absent key ≡ zero balance (`spec.md` §3).
    pub fn get_balance(&self, asset_id: &str, account_id: &str) -> Result<Balance, MinirohaError> {
        let key = keys::balance(asset_id, account_id);
        match self.get::<Balance>(&key)? {
            Some(b) => Ok(b),
            None => Ok(Balance {
                asset_id: miniroha_core::AssetId::new(asset_id)?,
                account_id: miniroha_core::AccountId::new(account_id)?,
                amount: miniroha_core::Amount::zero(),
            }),
        }
    }

    // ── Roles ────────────────────────────────────────────────────────────────

    pub fn get_role(&self, id: &str) -> Result<Option<Role>, MinirohaError> {
        self.get(&keys::role(id))
    }

    pub fn role_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_role(id)?.is_some())
    }

    // ── Validators ───────────────────────────────────────────────────────────

    pub fn get_validator(&self, id: &str) -> Result<Option<Validator>, MinirohaError> {
        self.get(&keys::validator(id))
    }

    /// Iterate the `validators/` prefix rather than probing a hardcoded
    /// `node1..node10` range (`spec.md` §9: cluster size must not be
    /// hard-capped).
    pub fn iter_validators(&self) -> Result<Vec<Validator>, MinirohaError> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(keys::VALIDATORS_PREFIX.as_bytes()) {
            let (_, bytes) = item.map_err(storage_err)?;
            out.push(decode(&bytes)?);
        }
        out.sort_by(|a: &Validator, b: &Validator| a.id.0.cmp(&b.id.0));
        Ok(out)
    }

    // ── Blocks ───────────────────────────────────────────────────────────────

    pub fn get_block(&self, height: Height) -> Result<Option<Block>, MinirohaError> {
        self.get(&keys::block(height))
    }

    pub fn get_block_by_hash(&self, hash: &str) -> Result<Option<Block>, MinirohaError> {
        let height: Option<Height> = self.get(&keys::block_by_hash(hash))?;
        match height {
            Some(h) => self.get_block(h),
            None => Ok(None),
        }
    }

    // ── Chain metadata ───────────────────────────────────────────────────────

    pub fn get_chain_id(&self) -> Result<Option<String>, MinirohaError> {
        self.get(keys::CHAIN_ID)
    }

    pub fn get_last_height(&self) -> Result<Height, MinirohaError> {
        Ok(self.get(keys::LAST_HEIGHT)?.unwrap_or(0))
    }

    pub fn is_bootstrapped(&self) -> Result<bool, MinirohaError> {
        Ok(self.get_last_height()? > 0)
    }

    // ── Transactions ─────────────────────────────────────────────────────────

    pub fn get_tx(&self, tx_hash: &str) -> Result<Option<miniroha_core::Transaction>, MinirohaError> {
        self.get(&keys::tx(tx_hash))
    }

    // ── Nonces ───────────────────────────────────────────────────────────────

    /// `spec.md` §9 "Nonce persistence": resolved in favor of an explicit
    /// stored per-signer key rather than rebuilding from tx history at
    /// cold start. Absent key ≡ nonce 0 ("initialized to 0").
    pub fn get_last_seen_nonce(&self, signer_id: &str) -> Result<Nonce, MinirohaError> {
        Ok(self.get(&keys::nonce(signer_id))?.unwrap_or(0))
    }

    // ── Atomic commit ────────────────────────────────────────────────────────

    pub fn commit(&self, batch: StateBatch) -> Result<(), MinirohaError> {
        self.db.apply_batch(batch.inner).map_err(storage_err)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), MinirohaError> {
        self.db.flush().map_err(storage_err)?;
        Ok(())
    }
}

/// A set of writes staged for one atomic commit (`spec.md` §4.2). Built up
/// by the instruction engine's caller (the block applier or genesis
/// bootstrap) and handed to [`StateStore::commit`] exactly once.
#[derive(Default)]
pub struct StateBatch {
    inner: Batch,
}

impl StateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), MinirohaError> {
        self.inner.insert(key.as_bytes(), encode(value)?);
        Ok(())
    }

    pub fn put_domain(&mut self, d: &Domain) -> Result<(), MinirohaError> {
        self.put(&keys::domain(&d.id.0), d)
    }

    pub fn put_account(&mut self, a: &Account) -> Result<(), MinirohaError> {
        self.put(&keys::account(&a.id.0), a)
    }

    pub fn put_account_roles(&mut self, id: &str, roles: &AccountRoles) -> Result<(), MinirohaError> {
        self.put(&keys::account_roles(id), roles)
    }

    pub fn put_asset(&mut self, a: &Asset) -> Result<(), MinirohaError> {
        self.put(&keys::asset(&a.id.0), a)
    }

    pub fn put_balance(&mut self, b: &Balance) -> Result<(), MinirohaError> {
        self.put(&keys::balance(&b.asset_id.0, &b.account_id.0), b)
    }

    /// Drop a balance key entirely (`spec.md` §3: zero balances are
    /// absent, not stored as zero).
    pub fn delete_balance(&mut self, asset_id: &str, account_id: &str) {
        self.inner.remove(keys::balance(asset_id, account_id).as_bytes());
    }

    pub fn put_role(&mut self, r: &Role) -> Result<(), MinirohaError> {
        self.put(&keys::role(&r.id.0), r)
    }

    pub fn put_validator(&mut self, v: &Validator) -> Result<(), MinirohaError> {
        self.put(&keys::validator(&v.id.0), v)
    }

    pub fn put_block(&mut self, b: &Block, hash: &str) -> Result<(), MinirohaError> {
        self.put(&keys::block(b.header.height), b)?;
        self.put(&keys::block_by_hash(hash), &b.header.height)
    }

    pub fn put_chain_id(&mut self, chain_id: &str) -> Result<(), MinirohaError> {
        self.put(keys::CHAIN_ID, &chain_id.to_string())
    }

    pub fn put_last_height(&mut self, height: Height) -> Result<(), MinirohaError> {
        self.put(keys::LAST_HEIGHT, &height)
    }

    pub fn put_tx(&mut self, tx_hash: &str, tx: &miniroha_core::Transaction) -> Result<(), MinirohaError> {
        self.put(&keys::tx(tx_hash), tx)
    }

    pub fn put_last_seen_nonce(&mut self, signer_id: &str, nonce: Nonce) -> Result<(), MinirohaError> {
        self.put(&keys::nonce(signer_id), &nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniroha_core::{AccountId, AssetId, DomainId};

    fn open_temp() -> (StateStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "miniroha_state_test_{}",
            std::process::id().wrapping_add(line!())
        ));
        let _ = std::fs::remove_dir_all(&dir);
        (StateStore::open(&dir).unwrap(), dir)
    }

    #[test]
    fn absent_balance_is_zero() {
        let (store, dir) = open_temp();
        let bal = store.get_balance("usd#root", "alice@root").unwrap();
        assert!(bal.amount.is_zero());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn batch_commits_atomically() {
        let (store, dir) = open_temp();
        let mut batch = StateBatch::new();
        batch
            .put_domain(&Domain {
                id: DomainId::new("root").unwrap(),
                created_at: 0,
            })
            .unwrap();
        batch
            .put_account(&Account {
                id: AccountId::new("alice@root").unwrap(),
                public_key: "ed25519:x".into(),
                created_at: 0,
            })
            .unwrap();
        store.commit(batch).unwrap();

        assert!(store.domain_exists("root").unwrap());
        assert!(store.account_exists("alice@root").unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn validators_prefix_scan_is_unbounded() {
        let (store, dir) = open_temp();
        let mut batch = StateBatch::new();
        for i in 1..=12 {
            batch
                .put_validator(&Validator {
                    id: miniroha_core::ValidatorId(format!("node{i}")),
                    public_key: "ed25519:x".into(),
                })
                .unwrap();
        }
        store.commit(batch).unwrap();
        assert_eq!(store.iter_validators().unwrap().len(), 12);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn balance_delete_makes_key_absent() {
        let (store, dir) = open_temp();
        let asset_id = AssetId::new("usd#root").unwrap();
        let account_id = AccountId::new("alice@root").unwrap();
        let mut batch = StateBatch::new();
        batch
            .put_balance(&Balance {
                asset_id: asset_id.clone(),
                account_id: account_id.clone(),
                amount: miniroha_core::Amount::from(100u64),
            })
            .unwrap();
        store.commit(batch).unwrap();
        assert!(!store.get_balance(asset_id.as_str(), account_id.as_str()).unwrap().amount.is_zero());

        let mut batch2 = StateBatch::new();
        batch2.delete_balance(asset_id.as_str(), account_id.as_str());
        store.commit(batch2).unwrap();
        assert!(store.get_balance(asset_id.as_str(), account_id.as_str()).unwrap().amount.is_zero());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
