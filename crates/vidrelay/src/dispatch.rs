//! First-success dispatch over a snapshot of the pool.
//!
//! Candidates are tried strictly in snapshot order. The first response that
//! passes validation (and the stream probe, when enabled) wins and no later
//! candidate is contacted. Every rejected candidate is demoted before moving
//! on. The attempt timeout bounds the whole attempt, stream probe included.
//! The global deadline is checked before each attempt: once less than one
//! attempt timeout remains, dispatch stops and the remaining candidates are
//! left untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::error::{Rejection, RelayError, Result, describe_timeout};
use crate::http::Transport;
use crate::pool::{Candidate, Category, InstancePool, SelectionMode};
use crate::probe::StreamProbe;
use crate::records::Sourced;
use crate::resource::Resource;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub attempt: Duration,
    pub deadline: Duration,
    pub probe: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for Timeouts {
    fn from(config: &RelayConfig) -> Self {
        Self {
            attempt: config.attempt_timeout(),
            deadline: config.deadline(),
            probe: config.probe_timeout(),
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    pool: Arc<InstancePool>,
    transport: Arc<dyn Transport>,
    timeouts: Timeouts,
}

impl Dispatcher {
    pub fn new(pool: Arc<InstancePool>, transport: Arc<dyn Transport>, timeouts: Timeouts) -> Self {
        Self {
            pool,
            transport,
            timeouts,
        }
    }

    pub fn pool(&self) -> &Arc<InstancePool> {
        &self.pool
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Returns the first accepted response among the candidates selected by
    /// `mode`, or [`RelayError::AllInstancesExhausted`].
    pub async fn first_success<R: Resource>(
        &self,
        resource: &R,
        mode: SelectionMode,
        cancel: &CancellationToken,
    ) -> Result<Sourced<R::Output>> {
        let category = resource.category();
        let snapshot = self.pool.snapshot(category, mode);
        let started = Instant::now();
        let mut attempted = 0;
        let mut deadline_hit = false;

        for candidate in &snapshot {
            if cancel.is_cancelled() {
                debug!(%category, attempted, "Dispatch cancelled");
                return Err(RelayError::Cancelled);
            }

            let remaining = self.timeouts.deadline.saturating_sub(started.elapsed());
            if remaining < self.timeouts.attempt {
                debug!(
                    %category,
                    attempted,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Deadline reached, abandoning remaining instances"
                );
                deadline_hit = true;
                break;
            }

            attempted += 1;
            match self.attempt(resource, candidate).await {
                Ok(record) => {
                    debug!(
                        instance = %candidate.instance,
                        provider = %candidate.provider,
                        %category,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Instance accepted"
                    );
                    return Ok(Sourced {
                        source: candidate.instance.clone(),
                        provider: candidate.provider,
                        record,
                    });
                }
                Err(rejection) => self.reject(candidate, category, &rejection),
            }
        }

        Err(RelayError::exhausted(category, attempted, deadline_hit))
    }

    /// One request against one candidate, fully validated. Request, decoding
    /// and stream probe together are cut off at the attempt timeout.
    pub(crate) async fn attempt<R: Resource>(
        &self,
        resource: &R,
        candidate: &Candidate,
    ) -> std::result::Result<R::Output, Rejection> {
        let limit = self.timeouts.attempt;
        tokio::time::timeout(limit, self.attempt_unbounded(resource, candidate, limit))
            .await
            .map_err(|_| Rejection::transport(describe_timeout(limit)))?
    }

    async fn attempt_unbounded<R: Resource>(
        &self,
        resource: &R,
        candidate: &Candidate,
        limit: Duration,
    ) -> std::result::Result<R::Output, Rejection> {
        let endpoint = resource.endpoint(candidate.provider);
        let url = candidate
            .instance
            .endpoint(&endpoint.path, &endpoint.query)
            .map_err(|e| Rejection::transport(format!("invalid endpoint: {e}")))?;

        debug!(%url, provider = %candidate.provider, category = %resource.category(), "Attempting instance");

        let reply = self.transport.get(&url, limit).await?;
        let payload = validate::decode(&reply)?;
        resource.validate(candidate.provider, &payload)?;
        let output = resource.map(candidate.provider, &payload);

        if R::PROBED && self.pool.stream_validation_enabled() {
            let media_url = R::media_url(&output)
                .ok_or_else(|| Rejection::unplayable("payload lists no media url"))?;
            StreamProbe::new(self.transport.as_ref(), self.timeouts.probe)
                .check(media_url)
                .await?;
        }

        Ok(output)
    }

    pub(crate) fn reject(&self, candidate: &Candidate, category: Category, rejection: &Rejection) {
        warn!(
            instance = %candidate.instance,
            provider = %candidate.provider,
            %category,
            reason = rejection.reason().as_str(),
            error = %rejection,
            "Instance rejected, demoting"
        );
        self.pool.demote_candidate(category, candidate);
    }
}
