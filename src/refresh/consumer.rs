use super::{RefreshResult, UpdateMessage, UpdateReceiver};
use crate::models::{Resource, ResourceCollection, ResourceKind};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The consumer-owned half of the view state. The foreground only ever sees
/// published snapshots behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    pub namespace: String,
    pub generation: u64,
    pub collections: BTreeMap<ResourceKind, ResourceCollection>,
    /// Last fetch error per kind for the current cycle.
    pub errors: BTreeMap<ResourceKind, String>,
    pub pending: usize,
    pub loading: bool,
    pub completed_at: Option<DateTime<Local>>,
}

impl LoadState {
    pub fn items(&self, kind: ResourceKind) -> &[Resource] {
        self.collections
            .get(&kind)
            .map(ResourceCollection::items)
            .unwrap_or_default()
    }

    pub fn error(&self, kind: ResourceKind) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }
}

/// Sole writer of collections and the pending counter.
pub struct UpdateConsumer {
    state: LoadState,
    publisher: watch::Sender<Arc<LoadState>>,
}

impl UpdateConsumer {
    pub fn new(namespace: &str) -> (Self, watch::Receiver<Arc<LoadState>>) {
        let state = LoadState {
            namespace: namespace.to_string(),
            ..Default::default()
        };
        let (publisher, rx) = watch::channel(Arc::new(state.clone()));
        (Self { state, publisher }, rx)
    }

    #[cfg(test)]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Applies one message. Returns whether the state changed.
    pub fn apply(&mut self, msg: UpdateMessage) -> bool {
        match msg {
            UpdateMessage::Begin {
                generation,
                namespace,
                kinds,
            } => self.begin(generation, namespace, kinds),
            UpdateMessage::Result(result) => self.complete(result),
        }
    }

    fn begin(&mut self, generation: u64, namespace: String, kinds: Vec<ResourceKind>) -> bool {
        if generation < self.state.generation {
            debug!(generation, current = self.state.generation, "ignoring superseded refresh");
            return false;
        }
        let state = &mut self.state;
        if state.pending > 0 {
            debug!(
                previous = state.generation,
                generation,
                outstanding = state.pending,
                "refresh superseded an in-flight cycle"
            );
        }
        state.generation = generation;
        state.pending = kinds.len();
        state.loading = state.pending > 0;
        for kind in kinds {
            state
                .collections
                .insert(kind, ResourceCollection::empty(kind, namespace.as_str()));
            state.errors.remove(&kind);
        }
        state.namespace = namespace;
        true
    }

    fn complete(&mut self, result: RefreshResult) -> bool {
        let RefreshResult {
            generation,
            kind,
            outcome,
        } = result;
        let state = &mut self.state;
        if generation != state.generation {
            debug!(generation, current = state.generation, kind = %kind, "discarding stale result");
            return false;
        }
        if state.pending == 0 {
            warn!(generation, kind = %kind, "result arrived for a finished cycle");
            return false;
        }

        match outcome {
            Ok(collection)
                if collection.kind() != kind || collection.namespace() != state.namespace =>
            {
                warn!(
                    generation,
                    kind = %kind,
                    listed = %collection.kind(),
                    namespace = collection.namespace(),
                    "result does not belong to this cycle"
                );
                state.errors.insert(
                    kind,
                    format!(
                        "listed {} in '{}' instead of '{}'",
                        collection.kind(),
                        collection.namespace(),
                        state.namespace
                    ),
                );
            }
            Ok(collection) => {
                debug!(generation, kind = %kind, count = collection.len(), "collection replaced");
                state.collections.insert(kind, collection);
            }
            Err(e) => {
                warn!(generation, kind = %kind, error = %e, "fetch failed");
                state.errors.insert(kind, e.to_string());
            }
        }

        state.pending -= 1;
        if state.pending == 0 {
            state.loading = false;
            state.completed_at = Some(Local::now());
            let counts = state
                .collections
                .iter()
                .map(|(k, c)| format!("{}={}", k.singular(), c.len()))
                .collect::<Vec<_>>()
                .join(" ");
            info!(generation, failed = state.errors.len(), counts = %counts, "refresh complete");
        }
        true
    }

    fn publish(&self) {
        self.publisher.send_replace(Arc::new(self.state.clone()));
    }

    /// Drains the queue until every sender is gone.
    pub async fn run(mut self, mut rx: UpdateReceiver) {
        while let Some(msg) = rx.recv().await {
            if self.apply(msg) {
                self.publish();
            }
        }
        debug!("update queue closed, consumer exiting");
    }
}
