//! Block verification and atomic apply (`spec.md` §4.6).

use std::collections::HashMap;

use miniroha_core::{Block, MinirohaError};
use miniroha_crypto::{canonical_bytes, hash_canonical};
use miniroha_engine::{execute, WorkingState};
use miniroha_mempool::Mempool;
use miniroha_state::StateStore;
use tracing::warn;

/// Verify a block's signature, chain linkage, and structural shape.
/// Transactions are not re-validated here — they were validated on
/// mempool admission.
pub fn verify_block(store: &StateStore, block: &Block) -> Result<(), MinirohaError> {
    let last_height = store.get_last_height()?;
    if block.header.height != last_height + 1 {
        return Err(MinirohaError::BlockVerificationFailed(format!(
            "expected height {}, got {}",
            last_height + 1,
            block.header.height
        )));
    }

    let expected_prev_hash = match store.get_block(last_height)? {
        Some(prev) => hash_canonical(&prev.header).map_err(|e| MinirohaError::Serialization(e.to_string()))?,
        None => String::new(),
    };
    if block.header.prev_hash != expected_prev_hash {
        return Err(MinirohaError::BlockVerificationFailed(
            "prev_hash mismatch".into(),
        ));
    }

    let validator = store
        .get_validator(&block.proposer_id)?
        .ok_or_else(|| MinirohaError::UnknownValidator(block.proposer_id.clone()))?;
    if validator.public_key != block.signature.public_key {
        return Err(MinirohaError::ConsensusInvalidSignature);
    }
    let payload_bytes = canonical_bytes(&block.signing_payload())
        .map_err(|e| MinirohaError::Serialization(e.to_string()))?;
    if !miniroha_crypto::verify(&block.signature.public_key, &block.signature.signature, &payload_bytes) {
        return Err(MinirohaError::ConsensusInvalidSignature);
    }

    Ok(())
}

/// Atomically apply a verified block: re-execute every transaction's
/// instructions, rolling a transaction back in-memory if any instruction
/// in it fails, then commit everything — transaction records, nonces,
/// block pointers, `last_height` — in one batch.
pub fn apply_block(
    store: &StateStore,
    mempool: &mut Mempool,
    block: &Block,
) -> Result<(), MinirohaError> {
    verify_block(store, block)?;

    let mut working = WorkingState::new(store);
    let mut last_seen_nonces: HashMap<String, u64> = HashMap::new();
    let mut committed: Vec<(String, &miniroha_core::Transaction)> = Vec::new();

    for tx in &block.transactions {
        let snapshot = working.snapshot();
        let mut failed = None;
        for instruction in &tx.body.instructions {
            if let Err(e) = execute(instruction, &mut working, tx.body.created_at) {
                failed = Some(e);
                break;
            }
        }
        match failed {
            Some(e) => {
                warn!(signer = %tx.body.signer_id, error = %e, "transaction failed during block apply, omitting");
                working.restore(snapshot);
            }
            None => {
                let tx_hash = miniroha_crypto::hash_canonical(tx)
                    .map_err(|e| MinirohaError::Serialization(e.to_string()))?;
                last_seen_nonces.insert(tx.body.signer_id.as_str().to_string(), tx.body.nonce);
                committed.push((tx_hash, tx));
            }
        }
    }

    let mut batch = working.into_batch()?;
    for (hash, tx) in &committed {
        batch.put_tx(hash, tx)?;
    }
    for (signer, nonce) in &last_seen_nonces {
        batch.put_last_seen_nonce(signer, *nonce)?;
    }
    let block_hash = hash_canonical(&block.header).map_err(|e| MinirohaError::Serialization(e.to_string()))?;
    batch.put_block(block, &block_hash)?;
    batch.put_last_height(block.header.height)?;

    store.commit(batch)?;

    let committed_hashes: Vec<String> = committed.into_iter().map(|(h, _)| h).collect();
    mempool.remove_committed(&committed_hashes);

    Ok(())
}
