//! An HTTP-backed [`Transport`]: broadcasts every consensus message by
//! `POST`ing it to each configured peer's `/consensus` endpoint
//! (`spec.md` §6 "Consensus endpoint"). This workspace does not implement
//! peer discovery or retry/backoff — that is the "inter-node message
//! transport" non-goal of `spec.md` §1; a real deployment needs a more
//! capable transport than this one.

use async_trait::async_trait;
use tracing::warn;

use miniroha_consensus::{ConsensusMessage, Transport};

pub struct HttpTransport {
    client: reqwest::Client,
    peers: Vec<String>,
}

impl HttpTransport {
    pub fn new(peers: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            peers,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn broadcast(&self, message: ConsensusMessage) {
        for peer in &self.peers {
            let url = format!("{peer}/consensus");
            if let Err(e) = self.client.post(&url).json(&message).send().await {
                warn!(peer = %peer, error = %e, "failed to broadcast consensus message");
            }
        }
    }
}
