//! The round-based BFT consensus engine (`spec.md` §4.8).

pub mod applier;
pub mod config;
pub mod engine;
pub mod messages;
pub mod state;
pub mod transport;
pub mod validators;

pub use applier::{BlockApplier, ChainHandle};
pub use config::TimeoutConfig;
pub use engine::{ConsensusEngine, StopHandle};
pub use messages::{ConsensusMessage, Proposal, Vote};
pub use state::{ConsensusState, Step};
pub use transport::{NullTransport, Transport};
pub use validators::ValidatorSet;
