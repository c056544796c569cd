//! Process-wide pool of mirror instances.
//!
//! Each category owns a primary (Invidious-compatible) and a secondary
//! (Piped-compatible) ordered list. Index 0 is tried first. All mutation goes
//! through [`InstancePool::demote`], [`InstancePool::rotate`] and
//! [`InstancePool::replace`], each under a single write lock, so concurrent
//! fetches can never duplicate or drop members. Dispatch iterates snapshots
//! taken with a read lock, never the live lists.

pub mod definition;
pub mod instance;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

pub use definition::{PoolDefinition, PoolDefinitionBuilder};
pub use instance::{Candidate, Category, Instance, Provider, SelectionMode};

use crate::error::{RelayError, Result};
use crate::http::Transport;

/// Moves the first occurrence of `instance` to the end of `list`.
///
/// Returns `false` and leaves the list untouched when `instance` is absent.
pub fn rotate_to_end(list: &mut Vec<Instance>, instance: &Instance) -> bool {
    match list.iter().position(|i| i == instance) {
        Some(index) => {
            let member = list.remove(index);
            list.push(member);
            true
        }
        None => false,
    }
}

/// Point-in-time copy of one category's lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySnapshot {
    pub category: Category,
    pub primary: Vec<Instance>,
    pub secondary: Vec<Instance>,
}

/// Point-in-time copy of the whole pool, as reported by `describe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub version: Option<u64>,
    pub stream_validation: bool,
    pub categories: Vec<CategorySnapshot>,
}

impl PoolSnapshot {
    pub fn category(&self, category: Category) -> Option<&CategorySnapshot> {
        self.categories.iter().find(|c| c.category == category)
    }
}

#[derive(Debug)]
pub struct InstancePool {
    state: RwLock<PoolDefinition>,
    stream_validation: AtomicBool,
}

impl Default for InstancePool {
    fn default() -> Self {
        Self::new(PoolDefinition::default())
    }
}

impl InstancePool {
    pub fn new(definition: PoolDefinition) -> Self {
        Self {
            state: RwLock::new(definition),
            stream_validation: AtomicBool::new(false),
        }
    }

    pub fn with_stream_validation(self, enabled: bool) -> Self {
        self.stream_validation.store(enabled, Ordering::SeqCst);
        self
    }

    /// Snapshot of the category's primary list.
    pub fn list_for(&self, category: Category) -> Vec<Instance> {
        self.list(Provider::Primary, category)
    }

    pub fn list(&self, provider: Provider, category: Category) -> Vec<Instance> {
        self.state.read().list(provider, category).to_vec()
    }

    /// Primary list followed by the secondary list.
    pub fn combined_list_for(&self, category: Category) -> Vec<Candidate> {
        self.snapshot(category, SelectionMode::Combined)
    }

    /// Ordered candidates for one fetch. Taken under a single read lock so
    /// both halves of a combined snapshot come from the same pool state.
    pub fn snapshot(&self, category: Category, mode: SelectionMode) -> Vec<Candidate> {
        let state = self.state.read();
        mode.providers()
            .iter()
            .flat_map(|&provider| {
                state
                    .list(provider, category)
                    .iter()
                    .cloned()
                    .map(move |instance| Candidate::new(provider, instance))
            })
            .collect()
    }

    /// Moves `instance` to the end of its list. No-op when absent.
    pub fn demote(&self, provider: Provider, category: Category, instance: &Instance) -> bool {
        let moved = {
            let mut state = self.state.write();
            let list = match provider {
                Provider::Primary => &mut state.primary[category.index()],
                Provider::Secondary => &mut state.secondary[category.index()],
            };
            rotate_to_end(list, instance)
        };
        if moved {
            debug!(%instance, %provider, %category, "Demoted instance to end of list");
        }
        moved
    }

    pub fn demote_candidate(&self, category: Category, candidate: &Candidate) -> bool {
        self.demote(candidate.provider, category, &candidate.instance)
    }

    /// Forces the current head of the category (in combined order) to the end
    /// of its list and returns it.
    pub fn rotate(&self, category: Category) -> Option<Candidate> {
        let mut state = self.state.write();
        let index = category.index();
        let (provider, list) = if !state.primary[index].is_empty() {
            (Provider::Primary, &mut state.primary[index])
        } else {
            (Provider::Secondary, &mut state.secondary[index])
        };
        let head = list.first()?.clone();
        rotate_to_end(list, &head);
        info!(instance = %head, %provider, %category, "Rotated head instance");
        Some(Candidate::new(provider, head))
    }

    /// Atomically swaps in a new definition; the old ordering is discarded.
    pub fn replace(&self, definition: PoolDefinition) {
        *self.state.write() = definition;
    }

    /// Fetches the definition document from `source` and swaps it in.
    ///
    /// On any failure the current pool is kept as is.
    pub async fn reload(
        &self,
        transport: &dyn Transport,
        source: &str,
        timeout: Duration,
    ) -> Result<PoolSnapshot> {
        let url = Url::parse(source)
            .map_err(|e| RelayError::pool_reload(format!("invalid source url `{source}`: {e}")))?;

        let reply = transport.get(&url, timeout).await.map_err(|e| {
            warn!(%url, error = %e, "Pool reload fetch failed");
            RelayError::pool_reload(e.to_string())
        })?;
        if !reply.is_success() {
            warn!(%url, status = reply.status, "Pool reload source answered with error status");
            return Err(RelayError::pool_reload(format!(
                "definition source returned HTTP {}",
                reply.status
            )));
        }

        let definition = PoolDefinition::from_json(&reply.body).map_err(|e| {
            warn!(%url, error = %e, "Pool reload document rejected");
            RelayError::pool_reload(e)
        })?;
        if definition.is_empty() {
            return Err(RelayError::pool_reload(
                "definition document lists no instances",
            ));
        }

        info!(%url, version = ?definition.version, "Instance pool reloaded");
        self.replace(definition);
        Ok(self.describe())
    }

    pub fn stream_validation_enabled(&self) -> bool {
        self.stream_validation.load(Ordering::SeqCst)
    }

    pub fn set_stream_validation(&self, enabled: bool) {
        self.stream_validation.store(enabled, Ordering::SeqCst);
    }

    /// Flips the stream-probe gate and returns the new value.
    pub fn toggle_stream_validation(&self) -> bool {
        let enabled = !self.stream_validation.fetch_xor(true, Ordering::SeqCst);
        info!(enabled, "Stream validation toggled");
        enabled
    }

    pub fn describe(&self) -> PoolSnapshot {
        let state = self.state.read();
        PoolSnapshot {
            version: state.version,
            stream_validation: self.stream_validation_enabled(),
            categories: Category::ALL
                .iter()
                .map(|&category| CategorySnapshot {
                    category,
                    primary: state.list(Provider::Primary, category).to_vec(),
                    secondary: state.list(Provider::Secondary, category).to_vec(),
                })
                .collect(),
        }
    }
}
