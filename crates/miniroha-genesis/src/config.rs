//! The genesis config shape (`spec.md` §4.7). Loading this from a file is
//! outside this crate's scope (`spec.md` §1's "genesis configuration
//! loader" is an external collaborator) — callers deserialize it however
//! they like and hand the bootstrap a value.

use serde::{Deserialize, Serialize};

use miniroha_core::{Account, Asset, Balance, Domain, Role, Validator};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub chain_id: String,
    pub domains: Vec<Domain>,
    pub accounts: Vec<GenesisAccount>,
    pub assets: Vec<Asset>,
    pub balances: Vec<Balance>,
    pub roles: Vec<Role>,
    pub validators: Vec<Validator>,
}

/// A genesis account plus the roles it holds — `spec.md` §4.2 stores roles
/// separately from the account record, but the config is more convenient
/// to author with them inline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisAccount {
    #[serde(flatten)]
    pub account: Account,
    #[serde(default)]
    pub roles: Vec<String>,
}
