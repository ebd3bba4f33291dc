//! The flat key layout of `spec.md` §4.2, reproduced verbatim as key
//! builder functions so every caller spells a key the same way.

pub fn domain(id: &str) -> String {
    format!("domains/{id}")
}

pub fn account(id: &str) -> String {
    format!("accounts/{id}")
}

pub fn account_roles(id: &str) -> String {
    format!("account_roles/{id}")
}

pub fn asset(id: &str) -> String {
    format!("assets/{id}")
}

pub fn balance(asset_id: &str, account_id: &str) -> String {
    format!("balances/{asset_id}/{account_id}")
}

pub const BALANCES_PREFIX: &str = "balances/";

pub fn role(id: &str) -> String {
    format!("roles/{id}")
}

pub fn validator(id: &str) -> String {
    format!("validators/{id}")
}

pub const VALIDATORS_PREFIX: &str = "validators/";

pub fn block(height: u64) -> String {
    format!("blocks/{height}")
}

pub fn block_by_hash(hash: &str) -> String {
    format!("blocks_by_hash/{hash}")
}

pub fn tx(tx_hash: &str) -> String {
    format!("txs/{tx_hash}")
}

pub fn nonce(signer_id: &str) -> String {
    format!("nonces/{signer_id}")
}

pub const CHAIN_ID: &str = "chain_id";
pub const LAST_HEIGHT: &str = "last_height";
