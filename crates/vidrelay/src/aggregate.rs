//! Fan-out dispatch: every candidate in the snapshot is attempted and every
//! accepted response is kept.

use futures::StreamExt;
use futures::stream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::error::{RelayError, Result};
use crate::pool::{Candidate, SelectionMode};
use crate::records::Sourced;
use crate::resource::Resource;

pub struct MultiSourceAggregator<'a> {
    dispatcher: &'a Dispatcher,
    concurrency: usize,
}

impl<'a> MultiSourceAggregator<'a> {
    pub fn new(dispatcher: &'a Dispatcher, concurrency: usize) -> Self {
        Self {
            dispatcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Attempts every candidate with at most `concurrency` requests in flight.
    ///
    /// Results keep the snapshot's priority order. Rejected candidates are
    /// demoted as soon as they fail. Candidates not yet started when `cancel`
    /// fires are skipped; in-flight attempts run to completion.
    pub async fn collect<R: Resource>(
        &self,
        resource: &R,
        mode: SelectionMode,
        cancel: &CancellationToken,
    ) -> Result<Vec<Sourced<R::Output>>> {
        let category = resource.category();
        let snapshot = self.dispatcher.pool().snapshot(category, mode);

        let outcomes: Vec<_> = stream::iter(snapshot.iter().cloned())
            .map(|candidate: Candidate| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                let outcome = self.dispatcher.attempt(resource, &candidate).await;
                if let Err(rejection) = &outcome {
                    self.dispatcher.reject(&candidate, category, rejection);
                }
                Some((candidate, outcome))
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let attempted = outcomes.iter().flatten().count();
        let accepted: Vec<_> = outcomes
            .into_iter()
            .flatten()
            .filter_map(|(candidate, outcome)| {
                outcome.ok().map(|record| Sourced {
                    source: candidate.instance,
                    provider: candidate.provider,
                    record,
                })
            })
            .collect();

        debug!(%category, attempted, accepted = accepted.len(), "Fan-out finished");

        if accepted.is_empty() {
            if cancel.is_cancelled() && attempted < snapshot.len() {
                return Err(RelayError::Cancelled);
            }
            return Err(RelayError::exhausted(category, attempted, false));
        }
        Ok(accepted)
    }
}
