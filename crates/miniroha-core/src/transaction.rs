use serde::{Deserialize, Serialize};

use crate::ids::AccountId;
use crate::instruction::Instruction;
use crate::types::{Nonce, Timestamp};

/// A base58-encoded detached signature plus the base58-encoded public key
/// that produced it. Public keys carry the `ed25519:` prefix (`spec.md`
/// §4.1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub public_key: String,
    pub signature: String,
}

/// The signed part of a transaction. `spec.md` §4.1: "Signing a
/// transaction signs `canonical(body)`."
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub chain_id: String,
    pub signer_id: AccountId,
    pub nonce: Nonce,
    pub created_at: Timestamp,
    pub instructions: Vec<Instruction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub body: TransactionBody,
    pub signature: Signature,
}
