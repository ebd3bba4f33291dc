//! Identifier newtypes and their shape constraints.
//!
//! `spec.md` §3: domain ids are 1-64 printable characters with no `@` or
//! `#`; account ids are `name@domain`; asset ids are `symbol#domain`.
//! All identifiers are case-sensitive plain strings underneath — the
//! newtypes exist so a `DomainId` can never be handed where an `AccountId`
//! is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MinirohaError;

fn is_printable(c: char) -> bool {
    !c.is_control()
}

/// Validate a domain id: 1-64 printable chars, no `@` or `#`.
pub fn validate_domain_id(s: &str) -> Result<(), MinirohaError> {
    if s.is_empty() || s.chars().count() > 64 {
        return Err(MinirohaError::InvalidDomainLength);
    }
    if s.contains('@') || s.contains('#') || !s.chars().all(is_printable) {
        return Err(MinirohaError::InvalidDomainId);
    }
    Ok(())
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub String);

impl DomainId {
    pub fn new(s: impl Into<String>) -> Result<Self, MinirohaError> {
        let s = s.into();
        validate_domain_id(&s)?;
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainId({})", self.0)
    }
}

/// `name@domain`. `name` and `domain` are both required to be non-empty;
/// existence of `domain` as a registered domain is checked by the engine,
/// not here (this type only enforces shape).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(s: impl Into<String>) -> Result<Self, MinirohaError> {
        let s = s.into();
        let (name, domain) = split_once(&s, '@').ok_or(MinirohaError::InvalidAccountFormat)?;
        if name.is_empty() || domain.is_empty() {
            return Err(MinirohaError::InvalidAccountFormat);
        }
        Ok(Self(s))
    }

    /// Split into `(name, domain)`. Panics if the id was constructed
    /// without going through [`AccountId::new`] and is malformed — every
    /// `AccountId` in this crate is constructed through `new`.
    pub fn parts(&self) -> (&str, &str) {
        split_once(&self.0, '@').expect("AccountId invariant: always has exactly one '@'")
    }

    pub fn domain(&self) -> DomainId {
        DomainId(self.parts().1.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

/// `symbol#domain`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(s: impl Into<String>) -> Result<Self, MinirohaError> {
        let s = s.into();
        let (symbol, domain) = split_once(&s, '#').ok_or(MinirohaError::InvalidAssetFormat)?;
        if symbol.is_empty() || domain.is_empty() {
            return Err(MinirohaError::InvalidAssetFormat);
        }
        Ok(Self(s))
    }

    pub fn parts(&self) -> (&str, &str) {
        split_once(&self.0, '#').expect("AssetId invariant: always has exactly one '#'")
    }

    pub fn domain(&self) -> DomainId {
        DomainId(self.parts().1.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Debug)]
#[serde(transparent)]
pub struct RoleId(pub String);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Debug)]
#[serde(transparent)]
pub struct ValidatorId(pub String);

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split on the first occurrence of `sep`, requiring exactly one occurrence
/// (mirrors `name@domain` / `symbol#domain` shape checks).
fn split_once(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut parts = s.splitn(2, sep);
    let first = parts.next()?;
    let rest = parts.next()?;
    if rest.contains(sep) {
        return None;
    }
    Some((first, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_requires_single_at() {
        assert!(AccountId::new("alice@root").is_ok());
        assert!(AccountId::new("alice").is_err());
        assert!(AccountId::new("alice@root@extra").is_err());
        assert!(AccountId::new("@root").is_err());
        assert!(AccountId::new("alice@").is_err());
    }

    #[test]
    fn asset_id_requires_single_hash() {
        assert!(AssetId::new("usd#root").is_ok());
        assert!(AssetId::new("usd").is_err());
        assert!(AssetId::new("usd#root#extra").is_err());
    }

    #[test]
    fn domain_id_rejects_reserved_chars() {
        assert!(DomainId::new("root").is_ok());
        assert!(DomainId::new("fin@nce").is_err());
        assert!(DomainId::new("fin#nce").is_err());
        assert!(DomainId::new("").is_err());
        assert!(DomainId::new("x".repeat(65)).is_err());
        assert!(DomainId::new("x".repeat(64)).is_ok());
    }

    #[test]
    fn account_id_parts() {
        let id = AccountId::new("alice@root").unwrap();
        assert_eq!(id.parts(), ("alice", "root"));
        assert_eq!(id.domain(), DomainId::new("root").unwrap());
    }
}
