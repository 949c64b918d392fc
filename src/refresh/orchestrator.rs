use super::{RefreshResult, UpdateMessage, UpdateSender};
use crate::errors::FetchError;
use crate::k8s::gateway::ResourceGateway;
use crate::models::ResourceKind;
use std::sync::Arc;
use tracing::{debug, info};

/// Fans a refresh out into one worker per registered kind.
pub struct FetchOrchestrator<G> {
    gateway: Arc<G>,
    kinds: Vec<ResourceKind>,
    tx: UpdateSender,
    generation: u64,
}

impl<G: ResourceGateway> FetchOrchestrator<G> {
    pub fn new(gateway: Arc<G>, kinds: Vec<ResourceKind>, tx: UpdateSender) -> Self {
        Self {
            gateway,
            kinds,
            tx,
            generation: 0,
        }
    }

    pub fn kinds(&self) -> &[ResourceKind] {
        &self.kinds
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Generation of the most recently started cycle, 0 before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a new cycle and returns its generation. Never blocks: the
    /// `Begin` marker and the results are queued from spawned tasks.
    pub fn start_refresh(&mut self, namespace: &str) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let kinds = self.kinds.clone();
        let namespace = namespace.to_owned();
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();

        info!(generation, namespace = %namespace, count = kinds.len(), "starting refresh");

        tokio::spawn(async move {
            let begin = UpdateMessage::Begin {
                generation,
                namespace: namespace.clone(),
                kinds: kinds.clone(),
            };
            if tx.send(begin).await.is_err() {
                debug!(generation, "update queue closed before refresh began");
                return;
            }
            for kind in kinds {
                let gateway = gateway.clone();
                let tx = tx.clone();
                let namespace = namespace.clone();
                tokio::spawn(async move {
                    let outcome = gateway
                        .list(kind, &namespace)
                        .await
                        .map_err(|source| FetchError { kind, source });
                    let result = RefreshResult {
                        generation,
                        kind,
                        outcome,
                    };
                    if tx.send(UpdateMessage::Result(result)).await.is_err() {
                        debug!(generation, kind = %kind, "update queue closed, dropping result");
                    }
                });
            }
        });

        generation
    }
}
