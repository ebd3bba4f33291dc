//! Block production (`spec.md` §4.6 "Production").

use miniroha_core::{Block, BlockHeader, BlockSigningPayload, MinirohaError, Signature};
use miniroha_crypto::{hash_canonical, KeyPair};
use miniroha_mempool::Mempool;
use miniroha_state::StateStore;

pub const DEFAULT_MAX_TX: usize = 500;
pub const DEFAULT_MAX_BYTES: usize = 1_000_000;

/// Build and sign the next block from the mempool. Refuses to produce on
/// an empty mempool — the caller (simple producer loop or a proposing
/// consensus validator) votes nil in that case instead of retrying here.
pub fn produce_block(
    store: &StateStore,
    mempool: &Mempool,
    proposer_id: &str,
    keypair: &KeyPair,
    now: i64,
) -> Result<Block, MinirohaError> {
    let transactions = mempool.take_for_block(DEFAULT_MAX_TX, DEFAULT_MAX_BYTES);
    if transactions.is_empty() {
        return Err(MinirohaError::Other("mempool is empty".into()));
    }

    let last_height = store.get_last_height()?;
    let prev_hash = match store.get_block(last_height)? {
        Some(prev) => hash_canonical(&prev.header).map_err(|e| MinirohaError::Serialization(e.to_string()))?,
        None => String::new(),
    };

    let header = BlockHeader {
        height: last_height + 1,
        prev_hash,
        timestamp: now,
        tx_root: None,
        state_root: None,
    };

    let payload = BlockSigningPayload {
        header: &header,
        transactions: &transactions,
        proposer_id,
    };
    let bytes = miniroha_crypto::canonical_bytes(&payload)
        .map_err(|e| MinirohaError::Serialization(e.to_string()))?;
    let signature = Signature {
        public_key: keypair.public_key_b58(),
        signature: keypair.sign(&bytes),
    };

    Ok(Block {
        header,
        transactions,
        proposer_id: proposer_id.to_string(),
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniroha_core::{AccountId, DomainId, Instruction, TransactionBody};

    fn open_temp() -> (StateStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "miniroha_producer_test_{}_{}",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        (StateStore::open(&dir).unwrap(), dir)
    }

    #[test]
    fn refuses_to_produce_on_empty_mempool() {
        let (store, dir) = open_temp();
        let mempool = Mempool::new(10);
        let kp = KeyPair::generate();
        let err = produce_block(&store, &mempool, "node1", &kp, 1).unwrap_err();
        assert!(matches!(err, MinirohaError::Other(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn produces_block_at_height_one_with_empty_prev_hash() {
        let (store, dir) = open_temp();
        let mut mempool = Mempool::new(10);
        let kp = KeyPair::generate();
        mempool
            .insert(miniroha_core::Transaction {
                body: TransactionBody {
                    chain_id: "miniroha-test".into(),
                    signer_id: AccountId::new("alice@root").unwrap(),
                    nonce: 1,
                    created_at: 1,
                    instructions: vec![Instruction::RegisterDomain {
                        id: DomainId::new("finance").unwrap(),
                    }],
                },
                signature: Signature {
                    public_key: "ed25519:x".into(),
                    signature: "sig".into(),
                },
            })
            .unwrap();

        let block = produce_block(&store, &mempool, "node1", &kp, 2).unwrap();
        assert_eq!(block.header.height, 1);
        assert_eq!(block.header.prev_hash, "");
        assert_eq!(block.transactions.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
