//! The static validator set loaded at initialization (`spec.md` §4.8).

use miniroha_core::Validator;

pub struct ValidatorSet {
    /// Sorted ascending by id — this order is the proposer rotation.
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(mut validators: Vec<Validator>) -> Self {
        validators.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Self { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// `f = ⌊(n−1)/3⌋`.
    pub fn max_faulty(&self) -> usize {
        (self.len().saturating_sub(1)) / 3
    }

    /// `Q = 2f+1`.
    pub fn quorum(&self) -> usize {
        2 * self.max_faulty() + 1
    }

    /// `sorted_validator_ids[(height + round) mod n]`.
    pub fn proposer_for(&self, height: u64, round: u64) -> Option<&Validator> {
        if self.validators.is_empty() {
            return None;
        }
        let idx = (height.wrapping_add(round)) as usize % self.validators.len();
        self.validators.get(idx)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.validators.iter().any(|v| v.id.0 == id)
    }

    pub fn public_key_of(&self, id: &str) -> Option<&str> {
        self.validators.iter().find(|v| v.id.0 == id).map(|v| v.public_key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniroha_core::ValidatorId;

    fn validator(id: &str) -> Validator {
        Validator {
            id: ValidatorId(id.into()),
            public_key: format!("ed25519:{id}"),
        }
    }

    #[test]
    fn quorum_for_four_validators_tolerates_one_fault() {
        let set = ValidatorSet::new(vec![
            validator("node1"),
            validator("node2"),
            validator("node3"),
            validator("node4"),
        ]);
        assert_eq!(set.max_faulty(), 1);
        assert_eq!(set.quorum(), 3);
    }

    #[test]
    fn proposer_rotates_by_height_plus_round_mod_n() {
        let set = ValidatorSet::new(vec![validator("node1"), validator("node2"), validator("node3")]);
        assert_eq!(set.proposer_for(1, 0).unwrap().id.0, "node2");
        assert_eq!(set.proposer_for(0, 0).unwrap().id.0, "node1");
        assert_eq!(set.proposer_for(2, 1).unwrap().id.0, "node1");
    }
}
