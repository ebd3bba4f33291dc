//! Round timeouts (`spec.md` §4.8 "Timeouts").

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct TimeoutConfig {
    pub propose: Duration,
    pub prevote: Duration,
    pub precommit: Duration,
    pub block_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            propose: Duration::from_secs(3),
            prevote: Duration::from_secs(2),
            precommit: Duration::from_secs(2),
            block_interval: Duration::from_secs(10),
        }
    }
}
