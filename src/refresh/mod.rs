//! Background refresh: one worker per kind fans out, results fan back in
//! through a bounded queue to a single consumer.

pub mod consumer;
pub mod orchestrator;

use crate::errors::FetchError;
use crate::models::{ResourceCollection, ResourceKind};
use tokio::sync::mpsc;

pub use consumer::{LoadState, UpdateConsumer};
pub use orchestrator::FetchOrchestrator;

/// Outcome of one worker. Exactly one per scheduled kind per cycle.
#[derive(Debug)]
pub struct RefreshResult {
    pub generation: u64,
    pub kind: ResourceKind,
    pub outcome: Result<ResourceCollection, FetchError>,
}

#[derive(Debug)]
pub enum UpdateMessage {
    /// Opens a cycle: `kinds.len()` results with this generation follow.
    Begin {
        generation: u64,
        namespace: String,
        kinds: Vec<ResourceKind>,
    },
    Result(RefreshResult),
}

pub type UpdateSender = mpsc::Sender<UpdateMessage>;
pub type UpdateReceiver = mpsc::Receiver<UpdateMessage>;

/// Queue capacity for `kinds` workers: room for several overlapping cycles.
pub fn default_capacity(kinds: usize) -> usize {
    (4 * kinds).max(16)
}

/// Bounded queue that never holds fewer slots than one cycle needs.
pub fn queue(capacity: usize, kinds: usize) -> (UpdateSender, UpdateReceiver) {
    let capacity = if capacity == 0 {
        default_capacity(kinds)
    } else {
        capacity.max(kinds + 1)
    };
    mpsc::channel(capacity)
}
