//! The persistent state layer: a flat key-value layout (`spec.md` §4.2)
//! over an embedded store, with atomic multi-key commits.

pub mod db;
pub mod keys;

pub use db::{StateBatch, StateStore};
