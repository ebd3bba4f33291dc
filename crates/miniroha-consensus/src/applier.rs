//! The commit-step dependency (`spec.md` §4.8 step 3: "atomically apply
//! `locked_block` via the block applier (§4.6)"). Abstracted behind a
//! trait so the engine's round logic can be tested without touching disk.

use miniroha_core::{Block, MinirohaError};
use miniroha_crypto::KeyPair;
use miniroha_mempool::Mempool;
use miniroha_state::StateStore;
use std::sync::{Arc, Mutex};

pub trait BlockApplier: Send + Sync {
    fn verify_block(&self, block: &Block) -> Result<(), MinirohaError>;
    fn apply_block(&self, block: &Block) -> Result<(), MinirohaError>;
    fn produce_block(&self, proposer_id: &str, keypair: &KeyPair, now: i64) -> Result<Block, MinirohaError>;
    fn last_height(&self) -> Result<miniroha_core::Height, MinirohaError>;
}

/// The production implementation: `miniroha-chain`'s free functions over
/// the node's shared store and mempool.
pub struct ChainHandle {
    store: StateStore,
    mempool: Arc<Mutex<Mempool>>,
}

impl ChainHandle {
    pub fn new(store: StateStore, mempool: Arc<Mutex<Mempool>>) -> Self {
        Self { store, mempool }
    }
}

impl BlockApplier for ChainHandle {
    fn verify_block(&self, block: &Block) -> Result<(), MinirohaError> {
        miniroha_chain::verify_block(&self.store, block)
    }

    fn apply_block(&self, block: &Block) -> Result<(), MinirohaError> {
        let mut mempool = self.mempool.lock().expect("mempool mutex poisoned");
        miniroha_chain::apply_block(&self.store, &mut mempool, block)
    }

    fn produce_block(&self, proposer_id: &str, keypair: &KeyPair, now: i64) -> Result<Block, MinirohaError> {
        let mempool = self.mempool.lock().expect("mempool mutex poisoned");
        miniroha_chain::produce_block(&self.store, &mempool, proposer_id, keypair, now)
    }

    fn last_height(&self) -> Result<miniroha_core::Height, MinirohaError> {
        self.store.get_last_height()
    }
}
