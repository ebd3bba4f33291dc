//! Content hashing (`spec.md` §4.1): SHA-512, base58-encoded.

use sha2::{Digest, Sha512};

use crate::canonical::{canonical_bytes, CanonicalError};
use serde::Serialize;

/// A 64-byte SHA-512 digest.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 64]);

impl ContentHash {
    pub fn of_bytes(data: &[u8]) -> Self {
        let digest = Sha512::digest(data);
        let mut out = [0u8; 64];
        out.copy_from_slice(&digest);
        Self(out)
    }

    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_b58(s: &str) -> Result<Self, bs58::decode::Error> {
        let bytes = bs58::decode(s).into_vec()?;
        let mut arr = [0u8; 64];
        if bytes.len() == 64 {
            arr.copy_from_slice(&bytes);
        }
        Ok(Self(arr))
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentHash({}…)", &self.to_b58()[..12.min(self.to_b58().len())])
    }
}

/// `hash(canonical(x))` as a base58 string — the helper every content-hash
/// call site in this workspace goes through (block hashing, tx hashing).
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let bytes = canonical_bytes(value)?;
    Ok(ContentHash::of_bytes(&bytes).to_b58())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = hash_canonical(&serde_json::json!({"b": 2, "a": 1})).unwrap();
        let b = hash_canonical(&serde_json::json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_changes_on_any_mutation() {
        let a = hash_canonical(&serde_json::json!({"a": 1})).unwrap();
        let b = hash_canonical(&serde_json::json!({"a": 2})).unwrap();
        assert_ne!(a, b);
    }
}
