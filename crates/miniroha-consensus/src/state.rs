//! Per-node consensus state for the current height/round (`spec.md` §4.8).

use std::collections::HashMap;

use miniroha_core::{Block, Height};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Propose,
    Prevote,
    Precommit,
}

pub struct ConsensusState {
    pub height: Height,
    pub round: u64,
    pub step: Step,
    pub locked_block: Option<Block>,
    pub locked_round: Option<u64>,
    pub valid_block: Option<Block>,
    pub valid_round: Option<u64>,
    /// validator_id -> voted block_hash (`None` = nil).
    pub prevotes: HashMap<String, Option<String>>,
    pub precommits: HashMap<String, Option<String>>,
}

impl ConsensusState {
    pub fn new(height: Height) -> Self {
        Self {
            height,
            round: 0,
            step: Step::Propose,
            locked_block: None,
            locked_round: None,
            valid_block: None,
            valid_round: None,
            prevotes: HashMap::new(),
            precommits: HashMap::new(),
        }
    }

    /// Clear the round's vote maps and set `step = propose` (`spec.md`
    /// §4.8 "A round begins by...").
    pub fn start_round(&mut self, round: u64) {
        self.round = round;
        self.step = Step::Propose;
        self.prevotes.clear();
        self.precommits.clear();
    }

    /// Advance to the next height, clearing locked/valid state.
    pub fn advance_height(&mut self) {
        self.height += 1;
        self.round = 0;
        self.step = Step::Propose;
        self.locked_block = None;
        self.locked_round = None;
        self.valid_block = None;
        self.valid_round = None;
        self.prevotes.clear();
        self.precommits.clear();
    }

    fn tally(votes: &HashMap<String, Option<String>>) -> HashMap<Option<String>, usize> {
        let mut counts: HashMap<Option<String>, usize> = HashMap::new();
        for v in votes.values() {
            *counts.entry(v.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// The `block_hash` (or `None` for nil) with `>= quorum` votes, if any.
    pub fn prevote_quorum(&self, quorum: usize) -> Option<Option<String>> {
        Self::tally(&self.prevotes)
            .into_iter()
            .find(|(_, count)| *count >= quorum)
            .map(|(hash, _)| hash)
    }

    pub fn precommit_quorum(&self, quorum: usize) -> Option<Option<String>> {
        Self::tally(&self.precommits)
            .into_iter()
            .find(|(_, count)| *count >= quorum)
            .map(|(hash, _)| hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_detected_once_threshold_reached() {
        let mut state = ConsensusState::new(1);
        state.prevotes.insert("a".into(), Some("H".into()));
        state.prevotes.insert("b".into(), Some("H".into()));
        assert!(state.prevote_quorum(3).is_none());
        state.prevotes.insert("c".into(), Some("H".into()));
        assert_eq!(state.prevote_quorum(3), Some(Some("H".into())));
    }

    #[test]
    fn nil_quorum_is_distinguished_from_block_quorum() {
        let mut state = ConsensusState::new(1);
        state.precommits.insert("a".into(), None);
        state.precommits.insert("b".into(), None);
        state.precommits.insert("c".into(), Some("H".into()));
        assert_eq!(state.precommit_quorum(2), Some(None));
    }

    #[test]
    fn start_round_clears_votes() {
        let mut state = ConsensusState::new(1);
        state.prevotes.insert("a".into(), Some("H".into()));
        state.start_round(1);
        assert!(state.prevotes.is_empty());
        assert_eq!(state.round, 1);
    }
}
