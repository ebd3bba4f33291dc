//! Consensus wire messages (`spec.md` §4.8 "Messages"). All three are
//! signed over a canonical `{type, height, round, block_hash}` payload;
//! the validator's registered public key (looked up by `validator_id`) is
//! what verifies the signature, not a key embedded in the message.

use serde::{Deserialize, Serialize};

use miniroha_core::{Block, Height, MinirohaError};
use miniroha_crypto::{canonical_bytes, KeyPair};

#[derive(Serialize)]
struct VotePayload<'a> {
    r#type: &'a str,
    height: Height,
    round: u64,
    block_hash: Option<&'a str>,
}

fn sign_vote(kind: &str, height: Height, round: u64, block_hash: Option<&str>, keypair: &KeyPair) -> String {
    let payload = VotePayload {
        r#type: kind,
        height,
        round,
        block_hash,
    };
    let bytes = canonical_bytes(&payload).expect("vote payload always serializes");
    keypair.sign(&bytes)
}

fn verify_vote(
    kind: &str,
    height: Height,
    round: u64,
    block_hash: Option<&str>,
    public_key: &str,
    signature: &str,
) -> bool {
    let payload = VotePayload {
        r#type: kind,
        height,
        round,
        block_hash,
    };
    let Ok(bytes) = canonical_bytes(&payload) else {
        return false;
    };
    miniroha_crypto::verify(public_key, signature, &bytes)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub height: Height,
    pub round: u64,
    pub validator_id: String,
    pub block_hash: String,
    pub block: Block,
    pub signature: String,
}

impl Proposal {
    pub fn new(height: Height, round: u64, validator_id: String, block_hash: String, block: Block, keypair: &KeyPair) -> Self {
        let signature = sign_vote("Proposal", height, round, Some(&block_hash), keypair);
        Self {
            height,
            round,
            validator_id,
            block_hash,
            block,
            signature,
        }
    }

    pub fn verify(&self, public_key: &str) -> bool {
        verify_vote(
            "Proposal",
            self.height,
            self.round,
            Some(&self.block_hash),
            public_key,
            &self.signature,
        )
    }
}

/// `PreVote` and `PreCommit` share the same signed shape; `block_hash`
/// absent is a nil vote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub height: Height,
    pub round: u64,
    pub validator_id: String,
    pub block_hash: Option<String>,
    pub signature: String,
}

impl Vote {
    pub fn new(kind: &str, height: Height, round: u64, validator_id: String, block_hash: Option<String>, keypair: &KeyPair) -> Self {
        let signature = sign_vote(kind, height, round, block_hash.as_deref(), keypair);
        Self {
            height,
            round,
            validator_id,
            block_hash,
            signature,
        }
    }

    pub fn verify(&self, kind: &str, public_key: &str) -> bool {
        verify_vote(
            kind,
            self.height,
            self.round,
            self.block_hash.as_deref(),
            public_key,
            &self.signature,
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConsensusMessage {
    Proposal(Proposal),
    PreVote(Vote),
    PreCommit(Vote),
}

impl ConsensusMessage {
    pub fn height(&self) -> Height {
        match self {
            ConsensusMessage::Proposal(p) => p.height,
            ConsensusMessage::PreVote(v) | ConsensusMessage::PreCommit(v) => v.height,
        }
    }

    pub fn round(&self) -> u64 {
        match self {
            ConsensusMessage::Proposal(p) => p.round,
            ConsensusMessage::PreVote(v) | ConsensusMessage::PreCommit(v) => v.round,
        }
    }

    pub fn validator_id(&self) -> &str {
        match self {
            ConsensusMessage::Proposal(p) => &p.validator_id,
            ConsensusMessage::PreVote(v) | ConsensusMessage::PreCommit(v) => &v.validator_id,
        }
    }

    /// A stable identity for idempotent dispatch (`spec.md` §6 "idempotent
    /// per message hash").
    pub fn message_hash(&self) -> Result<String, MinirohaError> {
        miniroha_crypto::hash_canonical(self).map_err(|e| MinirohaError::Serialization(e.to_string()))
    }
}
