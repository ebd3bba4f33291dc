//! Loads this node's signing keypair from a seed file, or generates an
//! ephemeral one with a loud warning (mirrors the teacher's
//! `load_or_generate_genesis_params` pattern).

use std::path::Path;

use anyhow::Context;
use tracing::warn;

use miniroha_crypto::KeyPair;

pub fn load_or_generate(path: Option<&Path>) -> anyhow::Result<KeyPair> {
    match path {
        Some(p) => {
            let seed = std::fs::read_to_string(p).with_context(|| format!("reading keyfile {}", p.display()))?;
            KeyPair::from_seed_b58(seed.trim()).map_err(|e| anyhow::anyhow!("decoding seed in {}: {e}", p.display()))
        }
        None => {
            warn!("no --keyfile provided; generating an ephemeral keypair — DO NOT USE IN PRODUCTION");
            Ok(KeyPair::generate())
        }
    }
}
