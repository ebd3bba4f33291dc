//! Idempotently installs block 1 from a genesis config (`spec.md` §4.7).

pub mod bootstrap;
pub mod config;

pub use bootstrap::{apply_genesis, is_bootstrapped};
pub use config::{GenesisAccount, GenesisConfig};
