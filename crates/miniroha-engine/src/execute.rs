//! Executes one [`Instruction`] against a [`WorkingState`] (`spec.md`
//! §4.3). Each arm is total and deterministic; none of them commit — the
//! caller collects writes across a whole block and commits once.

use miniroha_core::{Account, AccountRoles, Asset, Domain, Instruction, MinirohaError};

use crate::amount::parse_amount;
use crate::working::WorkingState;

/// Execute `instruction`, staging its effects into `working`. `now` is the
/// transaction's `created_at`, used for newly created entities'
/// `created_at` fields.
pub fn execute(
    instruction: &Instruction,
    working: &mut WorkingState<'_>,
    now: i64,
) -> Result<(), MinirohaError> {
    match instruction {
        Instruction::RegisterDomain { id } => {
            if working.domain_exists(id.as_str())? {
                return Err(MinirohaError::AlreadyExists(id.as_str().to_string()));
            }
            working.put_domain(Domain {
                id: id.clone(),
                created_at: now,
            });
            Ok(())
        }

        Instruction::RegisterAccount { id, public_key } => {
            let domain = id.domain();
            if !working.domain_exists(domain.as_str())? {
                return Err(MinirohaError::DomainNotFound(domain.as_str().to_string()));
            }
            if working.account_exists(id.as_str())? {
                return Err(MinirohaError::AlreadyExists(id.as_str().to_string()));
            }
            working.put_account(Account {
                id: id.clone(),
                public_key: public_key.clone(),
                created_at: now,
            });
            working.put_account_roles(id.as_str(), AccountRoles::default());
            Ok(())
        }

        Instruction::RegisterAsset { id, precision } => {
            if *precision > 18 {
                return Err(MinirohaError::InvalidPrecision);
            }
            let domain = id.domain();
            if !working.domain_exists(domain.as_str())? {
                return Err(MinirohaError::DomainNotFound(domain.as_str().to_string()));
            }
            if working.asset_exists(id.as_str())? {
                return Err(MinirohaError::AlreadyExists(id.as_str().to_string()));
            }
            working.put_asset(Asset {
                id: id.clone(),
                precision: *precision,
                created_at: now,
            });
            Ok(())
        }

        Instruction::MintAsset {
            asset_id,
            account_id,
            amount,
        } => {
            let asset = working
                .get_asset(asset_id.as_str())?
                .ok_or_else(|| MinirohaError::NotFound(asset_id.as_str().to_string()))?;
            if !working.account_exists(account_id.as_str())? {
                return Err(MinirohaError::NotFound(account_id.as_str().to_string()));
            }
            let delta = parse_amount(amount, asset.precision)?;
            let mut balance = working.get_balance(asset_id.as_str(), account_id.as_str())?;
            balance.amount = balance.amount.checked_add(&delta);
            working.put_balance(balance);
            Ok(())
        }

        Instruction::BurnAsset {
            asset_id,
            account_id,
            amount,
        } => {
            let asset = working
                .get_asset(asset_id.as_str())?
                .ok_or_else(|| MinirohaError::NotFound(asset_id.as_str().to_string()))?;
            if !working.account_exists(account_id.as_str())? {
                return Err(MinirohaError::NotFound(account_id.as_str().to_string()));
            }
            let delta = parse_amount(amount, asset.precision)?;
            let mut balance = working.get_balance(asset_id.as_str(), account_id.as_str())?;
            balance.amount = balance
                .amount
                .checked_sub(&delta)
                .ok_or(MinirohaError::InsufficientBalance)?;
            if balance.amount.is_zero() {
                working.delete_balance(asset_id.as_str(), account_id.as_str());
            } else {
                working.put_balance(balance);
            }
            Ok(())
        }

        Instruction::TransferAsset {
            asset_id,
            src,
            dst,
            amount,
        } => {
            let asset = working
                .get_asset(asset_id.as_str())?
                .ok_or_else(|| MinirohaError::NotFound(asset_id.as_str().to_string()))?;
            if !working.account_exists(src.as_str())? {
                return Err(MinirohaError::InvalidSrcAccount);
            }
            if !working.account_exists(dst.as_str())? {
                return Err(MinirohaError::InvalidDestAccount);
            }
            let delta = parse_amount(amount, asset.precision)?;

            let mut src_balance = working.get_balance(asset_id.as_str(), src.as_str())?;
            src_balance.amount = src_balance
                .amount
                .checked_sub(&delta)
                .ok_or(MinirohaError::InsufficientBalance)?;
            if src_balance.amount.is_zero() {
                working.delete_balance(asset_id.as_str(), src.as_str());
            } else {
                working.put_balance(src_balance);
            }

            let mut dst_balance = working.get_balance(asset_id.as_str(), dst.as_str())?;
            dst_balance.amount = dst_balance.amount.checked_add(&delta);
            working.put_balance(dst_balance);
            Ok(())
        }

        Instruction::GrantRole { role_id, account_id } => {
            if !working.role_exists(role_id.0.as_str())? {
                return Err(MinirohaError::NotFound(role_id.0.clone()));
            }
            if !working.account_exists(account_id.as_str())? {
                return Err(MinirohaError::NotFound(account_id.as_str().to_string()));
            }
            let mut roles = working.get_account_roles(account_id.as_str())?;
            roles.grant(role_id.clone());
            working.put_account_roles(account_id.as_str(), roles);
            Ok(())
        }

        Instruction::RevokeRole { role_id, account_id } => {
            if !working.account_exists(account_id.as_str())? {
                return Err(MinirohaError::NotFound(account_id.as_str().to_string()));
            }
            let mut roles = working.get_account_roles(account_id.as_str())?;
            roles.revoke(role_id);
            working.put_account_roles(account_id.as_str(), roles);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniroha_core::{AccountId, AssetId, DomainId, RoleId};
    use miniroha_state::StateStore;

    fn open_temp() -> (StateStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "miniroha_engine_test_{}_{}",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        (StateStore::open(&dir).unwrap(), dir)
    }

    #[test]
    fn register_domain_then_duplicate_fails() {
        let (store, dir) = open_temp();
        let mut working = WorkingState::new(&store);
        let id = DomainId::new("finance").unwrap();
        execute(&Instruction::RegisterDomain { id: id.clone() }, &mut working, 0).unwrap();
        let err = execute(&Instruction::RegisterDomain { id }, &mut working, 0).unwrap_err();
        assert!(matches!(err, MinirohaError::AlreadyExists(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn register_account_requires_existing_domain() {
        let (store, dir) = open_temp();
        let mut working = WorkingState::new(&store);
        let err = execute(
            &Instruction::RegisterAccount {
                id: AccountId::new("dave@nonexistent").unwrap(),
                public_key: "ed25519:x".into(),
            },
            &mut working,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, MinirohaError::DomainNotFound(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mint_then_transfer_then_insufficient_balance() {
        let (store, dir) = open_temp();
        let mut working = WorkingState::new(&store);
        let domain = DomainId::new("root").unwrap();
        let asset_id = AssetId::new("usd#root").unwrap();
        let alice = AccountId::new("alice@root").unwrap();
        let bob = AccountId::new("bob@root").unwrap();

        execute(&Instruction::RegisterDomain { id: domain }, &mut working, 0).unwrap();
        execute(
            &Instruction::RegisterAccount {
                id: alice.clone(),
                public_key: "ed25519:a".into(),
            },
            &mut working,
            0,
        )
        .unwrap();
        execute(
            &Instruction::RegisterAccount {
                id: bob.clone(),
                public_key: "ed25519:b".into(),
            },
            &mut working,
            0,
        )
        .unwrap();
        execute(
            &Instruction::RegisterAsset {
                id: asset_id.clone(),
                precision: 2,
            },
            &mut working,
            0,
        )
        .unwrap();
        execute(
            &Instruction::MintAsset {
                asset_id: asset_id.clone(),
                account_id: alice.clone(),
                amount: "1000".into(),
            },
            &mut working,
            0,
        )
        .unwrap();

        execute(
            &Instruction::TransferAsset {
                asset_id: asset_id.clone(),
                src: alice.clone(),
                dst: bob.clone(),
                amount: "100".into(),
            },
            &mut working,
            0,
        )
        .unwrap();

        assert_eq!(
            working.get_balance(asset_id.as_str(), alice.as_str()).unwrap().amount.to_string(),
            "90000"
        );
        assert_eq!(
            working.get_balance(asset_id.as_str(), bob.as_str()).unwrap().amount.to_string(),
            "10000"
        );

        let err = execute(
            &Instruction::TransferAsset {
                asset_id,
                src: alice,
                dst: bob,
                amount: "9999999900".into(),
            },
            &mut working,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, MinirohaError::InsufficientBalance));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn burn_to_zero_removes_balance_key() {
        let (store, dir) = open_temp();
        let mut working = WorkingState::new(&store);
        let domain = DomainId::new("root").unwrap();
        let asset_id = AssetId::new("usd#root").unwrap();
        let alice = AccountId::new("alice@root").unwrap();
        execute(&Instruction::RegisterDomain { id: domain }, &mut working, 0).unwrap();
        execute(
            &Instruction::RegisterAccount {
                id: alice.clone(),
                public_key: "ed25519:a".into(),
            },
            &mut working,
            0,
        )
        .unwrap();
        execute(
            &Instruction::RegisterAsset {
                id: asset_id.clone(),
                precision: 0,
            },
            &mut working,
            0,
        )
        .unwrap();
        execute(
            &Instruction::MintAsset {
                asset_id: asset_id.clone(),
                account_id: alice.clone(),
                amount: "5".into(),
            },
            &mut working,
            0,
        )
        .unwrap();
        execute(
            &Instruction::BurnAsset {
                asset_id: asset_id.clone(),
                account_id: alice.clone(),
                amount: "5".into(),
            },
            &mut working,
            0,
        )
        .unwrap();
        assert!(working.get_balance(asset_id.as_str(), alice.as_str()).unwrap().amount.is_zero());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn grant_then_revoke_role() {
        let (store, dir) = open_temp();
        let mut working = WorkingState::new(&store);
        let domain = DomainId::new("root").unwrap();
        let alice = AccountId::new("alice@root").unwrap();
        let role_id = RoleId("issuer".into());
        execute(&Instruction::RegisterDomain { id: domain }, &mut working, 0).unwrap();
        execute(
            &Instruction::RegisterAccount {
                id: alice.clone(),
                public_key: "ed25519:a".into(),
            },
            &mut working,
            0,
        )
        .unwrap();

        let err = execute(
            &Instruction::GrantRole {
                role_id: role_id.clone(),
                account_id: alice.clone(),
            },
            &mut working,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, MinirohaError::NotFound(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
