//! Crypto primitives: Ed25519 keypairs, canonical JSON serialization, and
//! SHA-512 content hashing (`spec.md` §4.1).

pub mod canonical;
pub mod hash;
pub mod keypair;

pub use canonical::{canonical_bytes, CanonicalError};
pub use hash::{hash_canonical, ContentHash};
pub use keypair::{verify, KeyPair, PUBLIC_KEY_PREFIX};
