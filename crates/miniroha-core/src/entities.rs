//! Core on-chain entities (`spec.md` §3).

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::ids::{AccountId, AssetId, DomainId, RoleId, ValidatorId};
use crate::types::Timestamp;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub created_at: Timestamp,
}

/// The account record as stored under `accounts/<id>`. Roles are held in a
/// separate `account_roles/<id>` entry (`spec.md` §4.2 key layout) so that
/// granting/revoking a role does not require rewriting the account blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub public_key: String,
    pub created_at: Timestamp,
}

/// Ordered set of role ids held by an account, preserving insertion order
/// (`spec.md` §4.3 GrantRole: "set semantics, preserving insertion order").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountRoles(pub Vec<RoleId>);

impl AccountRoles {
    pub fn contains(&self, role: &RoleId) -> bool {
        self.0.contains(role)
    }

    /// Insert if absent. Returns `true` if the role was newly added.
    pub fn grant(&mut self, role: RoleId) -> bool {
        if self.contains(&role) {
            false
        } else {
            self.0.push(role);
            true
        }
    }

    /// Remove if present. Returns `true` if the role was present.
    pub fn revoke(&mut self, role: &RoleId) -> bool {
        let before = self.0.len();
        self.0.retain(|r| r != role);
        self.0.len() != before
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub precision: u8,
    pub created_at: Timestamp,
}

/// `spec.md` §3: "Absent key ≡ zero balance. Balances drop to absent when
/// they would reach zero." The façade never stores a `Balance` with a zero
/// amount; this struct is only ever constructed for a present, non-zero
/// balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub asset_id: AssetId,
    pub account_id: AccountId,
    pub amount: Amount,
}

/// A permission token: either the wildcard `*` or the exact name of an
/// instruction variant (`spec.md` §3 and GLOSSARY).
pub type Permission = String;

pub const WILDCARD_PERMISSION: &str = "*";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == WILDCARD_PERMISSION || p == permission)
    }

    pub fn has_wildcard(&self) -> bool {
        self.permissions.iter().any(|p| p == WILDCARD_PERMISSION)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub id: ValidatorId,
    pub public_key: String,
}
