use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::http::DEFAULT_USER_AGENTS;
use crate::pool::PoolDefinition;

/// Relay settings. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bound on a single instance request.
    pub attempt_timeout_ms: u64,

    /// Wall-clock budget of one first-success fetch.
    pub deadline_ms: u64,

    /// Bound on one stream probe.
    pub probe_timeout_ms: u64,

    /// Bound on fetching the instance-definition document.
    pub reload_timeout_ms: u64,

    /// Parallel attempts in fan-out mode.
    pub fanout_concurrency: usize,

    /// Initial state of the stream probe gate.
    pub stream_validation: bool,

    /// Where `reload` fetches the instance-definition document from.
    pub definition_url: Option<String>,

    /// Picked at random per request.
    pub user_agents: Vec<String>,

    /// `hl` parameter of suggestion requests.
    pub suggest_language: String,

    /// Static pool used until the first reload succeeds.
    pub pool: Option<PoolDefinition>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 5_000,
            deadline_ms: 15_000,
            probe_timeout_ms: 3_000,
            reload_timeout_ms: 5_000,
            fanout_concurrency: 4,
            stream_validation: false,
            definition_url: None,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            suggest_language: "en".to_string(),
            pool: None,
        }
    }
}

impl RelayConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn reload_timeout(&self) -> Duration {
        Duration::from_millis(self.reload_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.attempt_timeout_ms == 0 {
            return Err(RelayError::configuration("attempt_timeout_ms must be positive"));
        }
        if self.deadline_ms < self.attempt_timeout_ms {
            return Err(RelayError::configuration(
                "deadline_ms must be at least attempt_timeout_ms",
            ));
        }
        if self.fanout_concurrency == 0 {
            return Err(RelayError::configuration("fanout_concurrency must be positive"));
        }
        Ok(())
    }
}
