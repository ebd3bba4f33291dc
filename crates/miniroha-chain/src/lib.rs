//! Block production and atomic application (`spec.md` §4.6).

pub mod applier;
pub mod producer;

pub use applier::{apply_block, verify_block};
pub use producer::produce_block;
