//! Executes instructions against state (`spec.md` §4.3). This crate knows
//! how to turn one instruction into writes; it never decides whether a
//! whole transaction or block should commit.

pub mod amount;
pub mod execute;
pub mod working;

pub use amount::parse_amount;
pub use execute::execute;
pub use working::WorkingState;
