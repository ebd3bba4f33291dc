use serde::{Deserialize, Serialize};

use crate::transaction::{Signature, Transaction};
use crate::types::{Height, Timestamp};

/// `spec.md` §3: `tx_root`/`state_root` are reserved fields, not required
/// for v1 consensus, so they round-trip through serde as `Option` and are
/// never populated by this workspace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: Height,
    pub prev_hash: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_root: Option<String>,
}

/// `spec.md` §4.1: "Signing a block signs
/// `canonical({header, transactions, proposer_id})`." This struct is the
/// exact shape that gets canonicalized and signed/hashed; `Block` adds the
/// `signature` field on top, which is excluded from its own hash.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockSigningPayload<'a> {
    pub header: &'a BlockHeader,
    pub transactions: &'a Vec<Transaction>,
    pub proposer_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub proposer_id: String,
    pub signature: Signature,
}

impl Block {
    pub fn signing_payload(&self) -> BlockSigningPayload<'_> {
        BlockSigningPayload {
            header: &self.header,
            transactions: &self.transactions,
            proposer_id: &self.proposer_id,
        }
    }
}
