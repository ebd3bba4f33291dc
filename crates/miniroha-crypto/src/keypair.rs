//! Ed25519 keypairs (`spec.md` §4.1).
//!
//! Public keys are `"ed25519:"` followed by base58 of the 32-byte public
//! key. Private keys are base58 of the 32-byte seed. Signatures are
//! base58 of the 64-byte detached signature. `verify` never panics or
//! throws across the component boundary — malformed prefixes, base58
//! decode failures, and genuine signature mismatches all collapse to
//! `false`, per `spec.md` §4.1 "Failure modes".

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

pub const PUBLIC_KEY_PREFIX: &str = "ed25519:";

/// A keypair holding only the 32-byte seed in memory, zeroized on drop.
/// The signing key itself is reconstructed on demand — cheap for Ed25519
/// and it keeps exactly one copy of the sensitive bytes alive at a time.
pub struct KeyPair {
    seed: Zeroizing<[u8; 32]>,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            verifying_key: signing_key.verifying_key(),
            seed: Zeroizing::new(signing_key.to_bytes()),
        }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self {
            verifying_key: signing_key.verifying_key(),
            seed: Zeroizing::new(seed),
        }
    }

    pub fn from_seed_b58(s: &str) -> Result<Self, bs58::decode::Error> {
        let bytes = bs58::decode(s).into_vec()?;
        let mut seed = [0u8; 32];
        if bytes.len() == 32 {
            seed.copy_from_slice(&bytes);
        }
        Ok(Self::from_seed(seed))
    }

    pub fn public_key_b58(&self) -> String {
        encode_public_key(&self.verifying_key)
    }

    pub fn seed_b58(&self) -> String {
        bs58::encode(self.seed.as_slice()).into_string()
    }

    /// Sign `message`, returning the base58-encoded detached signature.
    pub fn sign(&self, message: &[u8]) -> String {
        let signing_key = SigningKey::from_bytes(&self.seed);
        let sig: DalekSignature = signing_key.sign(message);
        bs58::encode(sig.to_bytes()).into_string()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ public_key: {} }}", self.public_key_b58())
    }
}

pub fn encode_public_key(vk: &VerifyingKey) -> String {
    format!("{PUBLIC_KEY_PREFIX}{}", bs58::encode(vk.to_bytes()).into_string())
}

fn decode_public_key(public_key: &str) -> Option<VerifyingKey> {
    let raw = public_key.strip_prefix(PUBLIC_KEY_PREFIX)?;
    let bytes = bs58::decode(raw).into_vec().ok()?;
    let arr: [u8; 32] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(&arr).ok()
}

fn decode_signature(signature: &str) -> Option<DalekSignature> {
    let bytes = bs58::decode(signature).into_vec().ok()?;
    let arr: [u8; 64] = bytes.try_into().ok()?;
    Some(DalekSignature::from_bytes(&arr))
}

/// Verify `signature` over `message` under `public_key`. Returns `false`
/// (never panics) on malformed prefix, bad base58, wrong-length bytes, or
/// a genuine signature mismatch.
pub fn verify(public_key: &str, signature: &str, message: &[u8]) -> bool {
    let Some(vk) = decode_public_key(public_key) else {
        return false;
    };
    let Some(sig) = decode_signature(signature) else {
        return false;
    };
    vk.verify(message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let kp = KeyPair::generate();
        let sig = kp.sign(b"hello");
        assert!(verify(&kp.public_key_b58(), &sig, b"hello"));
    }

    #[test]
    fn tampering_with_message_fails_verification() {
        let kp = KeyPair::generate();
        let sig = kp.sign(b"hello");
        assert!(!verify(&kp.public_key_b58(), &sig, b"hellp"));
    }

    #[test]
    fn malformed_inputs_return_false_not_panic() {
        assert!(!verify("not-a-key", "not-a-sig", b"x"));
        assert!(!verify("ed25519:", "", b"x"));
        assert!(!verify("rsa:abcdef", "abcdef", b"x"));
    }

    #[test]
    fn public_key_carries_prefix() {
        let kp = KeyPair::generate();
        assert!(kp.public_key_b58().starts_with(PUBLIC_KEY_PREFIX));
    }
}
