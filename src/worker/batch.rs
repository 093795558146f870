//! Caller-side handle for one submitted batch.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use crate::core::{BatchEvent, ProcessingTask, TaskId, TaskSnapshot};

/// Live view of a batch accepted by the orchestrator.
///
/// Events arrive as each task moves through its lifecycle; the stream ends
/// once every accepted task is terminal. `wait` consumes the handle and
/// returns the batch's final snapshots in submission order. The optimizer's
/// own task list keeps the items around afterwards regardless.
pub struct BatchHandle {
    accepted: usize,
    skipped: usize,
    ids: Vec<TaskId>,
    events: mpsc::UnboundedReceiver<BatchEvent>,
    items: Arc<Mutex<Vec<ProcessingTask>>>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl BatchHandle {
    pub(crate) fn new(
        accepted: usize,
        skipped: usize,
        ids: Vec<TaskId>,
        events: mpsc::UnboundedReceiver<BatchEvent>,
        items: Arc<Mutex<Vec<ProcessingTask>>>,
        workers: Vec<tokio::task::JoinHandle<()>>,
    ) -> Self {
        Self {
            accepted,
            skipped,
            ids,
            events,
            items,
            workers,
        }
    }

    /// Number of files accepted into this batch.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Number of files dropped by batch-cap truncation.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Next live update, or `None` once every task is terminal.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Waits for the whole batch and returns its final snapshots in
    /// submission order.
    pub async fn wait(mut self) -> Vec<TaskSnapshot> {
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                warn!("worker task failed to join: {e}");
            }
        }

        let items = self.items.lock().await;
        self.ids
            .iter()
            .filter_map(|id| items.iter().find(|t| t.id == *id).map(|t| t.snapshot()))
            .collect()
    }
}
