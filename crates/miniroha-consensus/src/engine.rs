//! The round-based BFT engine (`spec.md` §4.8). One logical event loop per
//! node: every state-mutating handler runs on `run`'s single task, so
//! there is no fine-grained locking to get wrong (`spec.md` §5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use tracing::{error, info, warn};

use miniroha_core::Height;
use miniroha_crypto::{hash_canonical, KeyPair};

use crate::applier::BlockApplier;
use crate::config::TimeoutConfig;
use crate::messages::{ConsensusMessage, Proposal, Vote};
use crate::state::{ConsensusState, Step};
use crate::transport::Transport;
use crate::validators::ValidatorSet;

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A cheap, cloneable handle to cancel a running [`ConsensusEngine`].
#[derive(Clone)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl StopHandle {
    /// Cancel any pending timer and prevent further round starts
    /// (`spec.md` §4.8 "Cancellation and shutdown").
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

pub struct ConsensusEngine<A: BlockApplier, T: Transport + ?Sized> {
    node_id: String,
    keypair: KeyPair,
    validators: ValidatorSet,
    state: ConsensusState,
    applier: Arc<A>,
    transport: Arc<T>,
    timeouts: TimeoutConfig,
    stopped: Arc<AtomicBool>,
    wake: Arc<Notify>,
    step_deadline: Instant,
    idle_deadline: Option<Instant>,
}

impl<A: BlockApplier, T: Transport + ?Sized> ConsensusEngine<A, T> {
    /// Restart from the persisted `last_height` (`spec.md` §4.8
    /// "Restart from persisted last_height").
    pub fn new(
        node_id: String,
        keypair: KeyPair,
        validators: ValidatorSet,
        applier: Arc<A>,
        transport: Arc<T>,
        timeouts: TimeoutConfig,
    ) -> Result<Self, miniroha_core::MinirohaError> {
        let last_height = applier.last_height()?;
        Ok(Self {
            node_id,
            keypair,
            validators,
            state: ConsensusState::new(last_height + 1),
            applier,
            transport,
            timeouts,
            stopped: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
            step_deadline: Instant::now(),
            idle_deadline: None,
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stopped: self.stopped.clone(),
            wake: self.wake.clone(),
        }
    }

    fn arm_step_timer(&mut self) {
        let duration = match self.state.step {
            Step::Propose => self.timeouts.propose,
            Step::Prevote => self.timeouts.prevote,
            Step::Precommit => self.timeouts.precommit,
        };
        self.step_deadline = Instant::now() + duration;
    }

    /// A round begins by clearing the round's vote maps and setting
    /// `step = propose` (`spec.md` §4.8 "Round algorithm").
    async fn start_round(&mut self, round: u64) {
        self.state.start_round(round);
        self.arm_step_timer();
        info!(height = self.state.height, round, "starting round");

        let Some(proposer) = self.validators.proposer_for(self.state.height, round) else {
            warn!("no validators configured, cannot select a proposer");
            return;
        };

        if proposer.id.0 != self.node_id {
            // Non-proposers wait in Propose step for a valid proposal or
            // the propose timeout.
            return;
        }

        match self.applier.produce_block(&self.node_id, &self.keypair, now()) {
            Ok(block) => {
                let Ok(block_hash) = hash_canonical(&block.header) else {
                    self.transition_to_prevote(None).await;
                    return;
                };
                self.state.valid_block = Some(block.clone());
                self.state.valid_round = Some(round);
                let proposal = Proposal::new(
                    self.state.height,
                    round,
                    self.node_id.clone(),
                    block_hash.clone(),
                    block,
                    &self.keypair,
                );
                self.transport.broadcast(ConsensusMessage::Proposal(proposal)).await;
                self.transition_to_prevote(Some(block_hash)).await;
            }
            Err(e) => {
                warn!(error = %e, "block production failed, voting nil");
                self.transition_to_prevote(None).await;
            }
        }
    }

    async fn transition_to_prevote(&mut self, block_hash: Option<String>) {
        self.state.step = Step::Prevote;
        self.arm_step_timer();
        self.send_prevote(block_hash).await;
    }

    async fn transition_to_precommit(&mut self, block_hash: Option<String>) {
        self.state.step = Step::Precommit;
        self.arm_step_timer();
        self.send_precommit(block_hash).await;
    }

    async fn send_prevote(&mut self, block_hash: Option<String>) {
        let vote = Vote::new(
            "PreVote",
            self.state.height,
            self.state.round,
            self.node_id.clone(),
            block_hash.clone(),
            &self.keypair,
        );
        self.state.prevotes.insert(self.node_id.clone(), block_hash);
        self.transport.broadcast(ConsensusMessage::PreVote(vote)).await;
        self.try_advance_from_prevotes().await;
    }

    async fn send_precommit(&mut self, block_hash: Option<String>) {
        let vote = Vote::new(
            "PreCommit",
            self.state.height,
            self.state.round,
            self.node_id.clone(),
            block_hash.clone(),
            &self.keypair,
        );
        self.state.precommits.insert(self.node_id.clone(), block_hash);
        self.transport.broadcast(ConsensusMessage::PreCommit(vote)).await;
        self.try_advance_from_precommits().await;
    }

    async fn handle_proposal(&mut self, proposal: Proposal) {
        if self.state.step != Step::Propose {
            return;
        }
        if proposal.height != self.state.height || proposal.round != self.state.round {
            return;
        }
        let Some(expected_proposer) = self.validators.proposer_for(self.state.height, self.state.round) else {
            return;
        };
        if proposal.validator_id != expected_proposer.id.0 {
            warn!(got = %proposal.validator_id, "proposal from non-proposer, dropping");
            return;
        }
        let Some(public_key) = self.validators.public_key_of(&proposal.validator_id) else {
            return;
        };
        if !proposal.verify(public_key) {
            warn!("proposal signature invalid, dropping");
            return;
        }
        let Ok(actual_hash) = hash_canonical(&proposal.block.header) else {
            self.transition_to_prevote(None).await;
            return;
        };
        if actual_hash != proposal.block_hash {
            self.transition_to_prevote(None).await;
            return;
        }
        if let Some(locked) = &self.state.locked_block {
            let locked_hash = hash_canonical(&locked.header).unwrap_or_default();
            if locked_hash != proposal.block_hash {
                // Locked on a different block: prevote nil (`spec.md`
                // §4.8 "Locking and safety").
                self.transition_to_prevote(None).await;
                return;
            }
        }
        if self.applier.verify_block(&proposal.block).is_err() {
            self.transition_to_prevote(None).await;
            return;
        }
        self.state.valid_block = Some(proposal.block);
        self.state.valid_round = Some(self.state.round);
        self.transition_to_prevote(Some(proposal.block_hash)).await;
    }

    async fn handle_prevote(&mut self, vote: Vote) {
        if vote.height != self.state.height || vote.round != self.state.round {
            return;
        }
        if !self.validators.contains(&vote.validator_id) {
            return;
        }
        let Some(public_key) = self.validators.public_key_of(&vote.validator_id) else {
            return;
        };
        if !vote.verify("PreVote", public_key) {
            return;
        }
        self.state.prevotes.insert(vote.validator_id, vote.block_hash);
        self.try_advance_from_prevotes().await;
    }

    async fn try_advance_from_prevotes(&mut self) {
        if self.state.step != Step::Prevote {
            return;
        }
        let quorum = self.validators.quorum();
        let Some(maybe_hash) = self.state.prevote_quorum(quorum) else {
            return;
        };
        match maybe_hash {
            Some(hash) => {
                self.state.locked_block = self.state.valid_block.clone();
                self.state.locked_round = Some(self.state.round);
                self.transition_to_precommit(Some(hash)).await;
            }
            None => {
                self.transition_to_precommit(None).await;
            }
        }
    }

    async fn handle_precommit(&mut self, vote: Vote) {
        if vote.height != self.state.height || vote.round != self.state.round {
            return;
        }
        if !self.validators.contains(&vote.validator_id) {
            return;
        }
        let Some(public_key) = self.validators.public_key_of(&vote.validator_id) else {
            return;
        };
        if !vote.verify("PreCommit", public_key) {
            return;
        }
        self.state.precommits.insert(vote.validator_id, vote.block_hash);
        self.try_advance_from_precommits().await;
    }

    async fn try_advance_from_precommits(&mut self) {
        if self.state.step != Step::Precommit {
            return;
        }
        let quorum = self.validators.quorum();
        let Some(maybe_hash) = self.state.precommit_quorum(quorum) else {
            return;
        };
        match maybe_hash {
            Some(hash) => {
                let locked_matches = self
                    .state
                    .locked_block
                    .as_ref()
                    .and_then(|b| hash_canonical(&b.header).ok())
                    .map(|h| h == hash)
                    .unwrap_or(false);
                if locked_matches {
                    self.commit().await;
                } else {
                    self.next_round().await;
                }
            }
            None => self.next_round().await,
        }
    }

    async fn next_round(&mut self) {
        let round = self.state.round + 1;
        Box::pin(self.start_round(round)).await;
    }

    /// Commit rule: `Q` precommits for the exact locked block hash
    /// (`spec.md` §4.8 "Precommit").
    async fn commit(&mut self) {
        let Some(block) = self.state.locked_block.clone() else {
            return;
        };
        match self.applier.apply_block(&block) {
            Ok(()) => {
                info!(height = self.state.height, "block committed");
                self.state.advance_height();
                self.idle_deadline = Some(Instant::now() + self.timeouts.block_interval);
            }
            Err(e) => {
                error!(error = %e, "block apply failed, restarting round");
                self.next_round().await;
            }
        }
    }

    async fn handle_timeout(&mut self) {
        match self.state.step {
            Step::Propose => self.transition_to_prevote(None).await,
            Step::Prevote => self.transition_to_precommit(None).await,
            Step::Precommit => self.next_round().await,
        }
    }

    async fn dispatch(&mut self, message: ConsensusMessage) {
        if message.height() != self.state.height {
            // Stale or future-height messages are dropped; v1 has no
            // message buffering across heights.
            return;
        }
        match message {
            ConsensusMessage::Proposal(p) => self.handle_proposal(p).await,
            ConsensusMessage::PreVote(v) => self.handle_prevote(v).await,
            ConsensusMessage::PreCommit(v) => self.handle_precommit(v).await,
        }
    }

    /// Drive the engine from `inbox` until [`StopHandle::stop`] is called
    /// or the channel closes.
    pub async fn run(mut self, mut inbox: mpsc::Receiver<ConsensusMessage>) {
        self.start_round(0).await;
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            let deadline = self.idle_deadline.unwrap_or(self.step_deadline);
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    if self.stopped.load(Ordering::SeqCst) {
                        break;
                    }
                    if self.idle_deadline.take().is_some() {
                        self.start_round(0).await;
                    } else {
                        self.handle_timeout().await;
                    }
                }
                maybe_message = inbox.recv() => {
                    match maybe_message {
                        Some(message) => self.dispatch(message).await,
                        None => break,
                    }
                }
                _ = self.wake.notified() => {}
            }
        }
        info!("consensus engine stopped");
    }

    pub fn height(&self) -> Height {
        self.state.height
    }
}
