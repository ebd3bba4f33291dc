//! An in-memory overlay on top of [`StateStore`] so that instructions
//! within the same transaction (and transactions within the same block)
//! observe each other's writes before anything is committed.
//!
//! The block applier snapshots the overlay before each transaction and
//! restores it if any instruction in that transaction fails (`spec.md`
//! §4.6: "rolled back in-memory if any instruction fails"). Once a block
//! finishes, [`WorkingState::into_batch`] turns every staged write into a
//! single [`StateBatch`] for the one atomic commit.

use std::collections::HashMap;

use miniroha_core::{Account, AccountRoles, Asset, Balance, Domain, MinirohaError, Role};
use miniroha_state::{StateBatch, StateStore};

/// Roles are never mutated by an instruction in this workspace (there is
/// no `RegisterRole`; genesis writes them directly), so they are read
/// straight through to the store with no overlay.
#[derive(Clone, Default)]
pub struct Snapshot {
    domains: HashMap<String, Option<Domain>>,
    accounts: HashMap<String, Option<Account>>,
    account_roles: HashMap<String, Option<AccountRoles>>,
    assets: HashMap<String, Option<Asset>>,
    balances: HashMap<(String, String), Option<Balance>>,
}

pub struct WorkingState<'a> {
    store: &'a StateStore,
    overlay: Snapshot,
}

impl<'a> WorkingState<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self {
            store,
            overlay: Snapshot::default(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.overlay.clone()
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.overlay = snapshot;
    }

    // ── Domains ──────────────────────────────────────────────────────────────

    pub fn domain_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        match self.overlay.domains.get(id) {
            Some(v) => Ok(v.is_some()),
            None => self.store.domain_exists(id),
        }
    }

    pub fn put_domain(&mut self, d: Domain) {
        self.overlay.domains.insert(d.id.0.clone(), Some(d));
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn get_account(&self, id: &str) -> Result<Option<Account>, MinirohaError> {
        match self.overlay.accounts.get(id) {
            Some(v) => Ok(v.clone()),
            None => self.store.get_account(id),
        }
    }

    pub fn account_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_account(id)?.is_some())
    }

    pub fn put_account(&mut self, a: Account) {
        self.overlay.accounts.insert(a.id.0.clone(), Some(a));
    }

    pub fn get_account_roles(&self, id: &str) -> Result<AccountRoles, MinirohaError> {
        match self.overlay.account_roles.get(id) {
            Some(v) => Ok(v.clone().unwrap_or_default()),
            None => self.store.get_account_roles(id),
        }
    }

    pub fn put_account_roles(&mut self, id: &str, roles: AccountRoles) {
        self.overlay.account_roles.insert(id.to_string(), Some(roles));
    }

    // ── Assets ───────────────────────────────────────────────────────────────

    pub fn get_asset(&self, id: &str) -> Result<Option<Asset>, MinirohaError> {
        match self.overlay.assets.get(id) {
            Some(v) => Ok(v.clone()),
            None => self.store.get_asset(id),
        }
    }

    pub fn asset_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_asset(id)?.is_some())
    }

    pub fn put_asset(&mut self, a: Asset) {
        self.overlay.assets.insert(a.id.0.clone(), Some(a));
    }

    // ── Balances ─────────────────────────────────────────────────────────────

    pub fn get_balance(&self, asset_id: &str, account_id: &str) -> Result<Balance, MinirohaError> {
        let key = (asset_id.to_string(), account_id.to_string());
        match self.overlay.balances.get(&key) {
            Some(Some(b)) => Ok(b.clone()),
            Some(None) => Ok(Balance {
                asset_id: miniroha_core::AssetId::new(asset_id)?,
                account_id: miniroha_core::AccountId::new(account_id)?,
                amount: miniroha_core::Amount::zero(),
            }),
            None => self.store.get_balance(asset_id, account_id),
        }
    }

    pub fn put_balance(&mut self, b: Balance) {
        let key = (b.asset_id.0.clone(), b.account_id.0.clone());
        self.overlay.balances.insert(key, Some(b));
    }

    /// Mark a balance as deleted in the overlay (`spec.md` §3: absent ≡
    /// zero). A `None` overlay entry always wins over the underlying store.
    pub fn delete_balance(&mut self, asset_id: &str, account_id: &str) {
        let key = (asset_id.to_string(), account_id.to_string());
        self.overlay.balances.insert(key, None);
    }

    // ── Roles ────────────────────────────────────────────────────────────────

    pub fn get_role(&self, id: &str) -> Result<Option<Role>, MinirohaError> {
        self.store.get_role(id)
    }

    pub fn role_exists(&self, id: &str) -> Result<bool, MinirohaError> {
        Ok(self.get_role(id)?.is_some())
    }

    /// Flatten every staged write into one batch for atomic commit.
    /// Balances overlaid as `None` become batch deletes; everything else
    /// becomes a put.
    pub fn into_batch(self) -> Result<StateBatch, MinirohaError> {
        let mut batch = StateBatch::new();
        for (_, v) in self.overlay.domains {
            if let Some(d) = v {
                batch.put_domain(&d)?;
            }
        }
        for (_, v) in self.overlay.accounts {
            if let Some(a) = v {
                batch.put_account(&a)?;
            }
        }
        for (id, v) in self.overlay.account_roles {
            if let Some(roles) = v {
                batch.put_account_roles(&id, &roles)?;
            }
        }
        for (_, v) in self.overlay.assets {
            if let Some(a) = v {
                batch.put_asset(&a)?;
            }
        }
        for ((asset_id, account_id), v) in self.overlay.balances {
            match v {
                Some(b) => batch.put_balance(&b)?,
                None => batch.delete_balance(&asset_id, &account_id),
            }
        }
        Ok(batch)
    }
}
