//! Shared domain types for the Miniroha permissioned ledger: identifiers,
//! entities, the instruction set, transactions, and blocks. Nothing in
//! this crate talks to storage, crypto, or the network — it is the
//! vocabulary every other crate in the workspace shares.

pub mod amount;
pub mod block;
pub mod entities;
pub mod error;
pub mod ids;
pub mod instruction;
pub mod transaction;
pub mod types;

pub use amount::Amount;
pub use block::{Block, BlockHeader, BlockSigningPayload};
pub use entities::{
    Account, AccountRoles, Asset, Balance, Domain, Permission, Role, Validator,
    WILDCARD_PERMISSION,
};
pub use error::MinirohaError;
pub use ids::{AccountId, AssetId, DomainId, RoleId, ValidatorId};
pub use instruction::Instruction;
pub use transaction::{Signature, Transaction, TransactionBody};
pub use types::{Height, Nonce, Timestamp};
