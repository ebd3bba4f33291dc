//! The abstract broadcast boundary (`spec.md` §1: "emits broadcast events
//! to an abstract transport; the transport itself is not part of the
//! core"). Inter-node wiring lives outside this crate.

use async_trait::async_trait;

use crate::messages::ConsensusMessage;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn broadcast(&self, message: ConsensusMessage);
}

/// A transport that discards every broadcast message instead of sending
/// it anywhere — used by tests and by a single-node deployment where
/// there is no one else to broadcast to.
#[derive(Default)]
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn broadcast(&self, _message: ConsensusMessage) {}
}
