//! Genesis bootstrap (`spec.md` §4.7): validates a [`GenesisConfig`] for
//! referential integrity, then writes every entity plus block 1 in a
//! single atomic batch.

use std::collections::HashSet;

use miniroha_core::{Block, BlockHeader, MinirohaError, RoleId, Signature, WILDCARD_PERMISSION};
use miniroha_crypto::hash_canonical;
use miniroha_state::{StateBatch, StateStore};
use tracing::info;

use crate::config::GenesisConfig;

const GENESIS_PROPOSER_ID: &str = "genesis";

/// Referential integrity: every account's domain and every balance's
/// asset/account must be present in the same config; at least one
/// validator; at least one `admin` role containing `*`; at least one
/// account holding the admin role.
fn validate_config(config: &GenesisConfig) -> Result<(), MinirohaError> {
    let domain_ids: HashSet<&str> = config.domains.iter().map(|d| d.id.as_str()).collect();
    let account_ids: HashSet<&str> = config.accounts.iter().map(|a| a.account.id.as_str()).collect();
    let asset_ids: HashSet<&str> = config.assets.iter().map(|a| a.id.as_str()).collect();
    let role_ids: HashSet<&str> = config.roles.iter().map(|r| r.id.0.as_str()).collect();

    for account in &config.accounts {
        let domain = account.account.id.domain();
        if !domain_ids.contains(domain.as_str()) {
            return Err(MinirohaError::DomainNotFound(domain.as_str().to_string()));
        }
        for role in &account.roles {
            if !role_ids.contains(role.as_str()) {
                return Err(MinirohaError::NotFound(format!("role {role}")));
            }
        }
    }

    for asset in &config.assets {
        let domain = asset.id.domain();
        if !domain_ids.contains(domain.as_str()) {
            return Err(MinirohaError::DomainNotFound(domain.as_str().to_string()));
        }
    }

    for balance in &config.balances {
        if !asset_ids.contains(balance.asset_id.as_str()) {
            return Err(MinirohaError::NotFound(balance.asset_id.as_str().to_string()));
        }
        if !account_ids.contains(balance.account_id.as_str()) {
            return Err(MinirohaError::NotFound(balance.account_id.as_str().to_string()));
        }
    }

    if config.validators.is_empty() {
        return Err(MinirohaError::Other("genesis requires at least one validator".into()));
    }

    let has_admin_role = config
        .roles
        .iter()
        .any(|r| r.id.0 == "admin" && r.permissions.iter().any(|p| p == WILDCARD_PERMISSION));
    if !has_admin_role {
        return Err(MinirohaError::Other(
            "genesis requires a role named 'admin' containing '*'".into(),
        ));
    }

    let has_admin_account = config
        .accounts
        .iter()
        .any(|a| a.roles.iter().any(|r| r == "admin"));
    if !has_admin_account {
        return Err(MinirohaError::Other(
            "genesis requires at least one account holding the admin role".into(),
        ));
    }

    Ok(())
}

/// Validate `config`, then compose and commit the single genesis batch:
/// every entity plus block 1. Returns an error without writing anything
/// if validation fails.
pub fn apply_genesis(store: &StateStore, config: &GenesisConfig) -> Result<(), MinirohaError> {
    validate_config(config)?;
    info!(chain_id = %config.chain_id, "applying genesis config");

    let mut batch = StateBatch::new();
    batch.put_chain_id(&config.chain_id)?;

    for domain in &config.domains {
        batch.put_domain(domain)?;
    }
    for account in &config.accounts {
        batch.put_account(&account.account)?;
        let roles = account.roles.iter().map(|r| RoleId(r.clone())).collect();
        batch.put_account_roles(account.account.id.as_str(), &miniroha_core::AccountRoles(roles))?;
    }
    for asset in &config.assets {
        batch.put_asset(asset)?;
    }
    for balance in &config.balances {
        if !balance.amount.is_zero() {
            batch.put_balance(balance)?;
        }
    }
    for role in &config.roles {
        batch.put_role(role)?;
    }
    for validator in &config.validators {
        batch.put_validator(validator)?;
    }

    let header = BlockHeader {
        height: 1,
        prev_hash: String::new(),
        timestamp: 0,
        tx_root: None,
        state_root: None,
    };
    let block_hash = hash_canonical(&header).map_err(|e| MinirohaError::Serialization(e.to_string()))?;
    // Genesis has no proposer key to sign with; its signature is empty and
    // the block applier never re-verifies block 1.
    let block = Block {
        header,
        transactions: Vec::new(),
        proposer_id: GENESIS_PROPOSER_ID.to_string(),
        signature: Signature {
            public_key: String::new(),
            signature: String::new(),
        },
    };
    batch.put_block(&block, &block_hash)?;
    batch.put_last_height(1)?;

    store.commit(batch)?;
    info!(height = 1, "genesis block committed");
    Ok(())
}

pub fn is_bootstrapped(store: &StateStore) -> Result<bool, MinirohaError> {
    store.is_bootstrapped()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenesisAccount;
    use miniroha_core::{Account, AccountId, Amount, AssetId, Domain, DomainId, Role};

    fn open_temp() -> (StateStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "miniroha_genesis_test_{}_{}",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        (StateStore::open(&dir).unwrap(), dir)
    }

    fn sample_config() -> GenesisConfig {
        GenesisConfig {
            chain_id: "miniroha-test".into(),
            domains: vec![Domain {
                id: DomainId::new("root").unwrap(),
                created_at: 0,
            }],
            accounts: vec![GenesisAccount {
                account: Account {
                    id: AccountId::new("admin@root").unwrap(),
                    public_key: "ed25519:x".into(),
                    created_at: 0,
                },
                roles: vec!["admin".into()],
            }],
            assets: vec![miniroha_core::Asset {
                id: AssetId::new("usd#root").unwrap(),
                precision: 2,
                created_at: 0,
            }],
            balances: vec![],
            roles: vec![Role {
                id: RoleId("admin".into()),
                permissions: vec!["*".into()],
            }],
            validators: vec![miniroha_core::Validator {
                id: miniroha_core::ValidatorId("node1".into()),
                public_key: "ed25519:v".into(),
            }],
        }
    }

    #[test]
    fn bootstraps_and_is_idempotency_checkable() {
        let (store, dir) = open_temp();
        let config = sample_config();
        assert!(!is_bootstrapped(&store).unwrap());
        apply_genesis(&store, &config).unwrap();
        assert!(is_bootstrapped(&store).unwrap());
        assert_eq!(store.get_chain_id().unwrap().unwrap(), "miniroha-test");
        assert!(store.account_exists("admin@root").unwrap());
        assert_eq!(
            store.get_account_roles("admin@root").unwrap().0,
            vec![RoleId("admin".into())]
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_account_with_unknown_domain() {
        let (store, dir) = open_temp();
        let mut config = sample_config();
        config.accounts[0].account.id = AccountId::new("admin@missing").unwrap();
        assert!(matches!(
            apply_genesis(&store, &config),
            Err(MinirohaError::DomainNotFound(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_missing_admin_role() {
        let (store, dir) = open_temp();
        let mut config = sample_config();
        config.roles.clear();
        config.accounts[0].roles.clear();
        assert!(apply_genesis(&store, &config).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_zero_balance_requires_known_asset_and_account() {
        let (store, dir) = open_temp();
        let mut config = sample_config();
        config.balances.push(miniroha_core::Balance {
            asset_id: AssetId::new("idr#root").unwrap(),
            account_id: AccountId::new("admin@root").unwrap(),
            amount: Amount::from(100u64),
        });
        assert!(matches!(
            apply_genesis(&store, &config),
            Err(MinirohaError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
