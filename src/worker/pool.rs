//! The batch orchestrator and its bounded worker pool.
//!
//! A submission is validated synchronously, truncated to the batch cap and
//! turned into queued tasks. A fixed set of workers (at most
//! `max_concurrency` per submission) then drains the queue: each worker
//! loops "dequeue or exit", runs the CPU-bound pipeline inside
//! `spawn_blocking`, and reports the terminal state the moment it is known.
//! One task failing never aborts its siblings.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::core::{
    BatchEvent, BatchProgress, PipelineConfig, ProcessingTask, SourceImage, TaskId, TaskSnapshot,
    TaskStatus,
};
use crate::processing::{self, validate_source};
use crate::utils::{OptimizerResult, PipelineError, ValidationError};
use crate::worker::BatchHandle;

/// Entry point for batch thumbnail optimization.
///
/// Owns the task list exclusively: consumers read snapshots and never
/// mutate task state directly. Completed and failed items stay in the list
/// until [`clear`](Self::clear) is called.
#[derive(Clone)]
pub struct ThumbnailOptimizer {
    config: Arc<PipelineConfig>,
    items: Arc<Mutex<Vec<ProcessingTask>>>,
}

impl ThumbnailOptimizer {
    pub fn new(config: PipelineConfig) -> OptimizerResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            items: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Submits a batch of files for processing.
    ///
    /// Everything beyond `max_batch_size` files is dropped and reported via
    /// the skipped count. Files failing validation become `Error` items
    /// immediately and never occupy a worker slot. Valid files are queued in
    /// submission order; the task list displays the newest batch first.
    ///
    /// Fails only on contract violations (an empty submission); per-file
    /// problems are reported through the per-task states instead.
    pub async fn submit(&self, files: Vec<SourceImage>) -> OptimizerResult<BatchHandle> {
        if files.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }

        let submitted = files.len();
        let mut files = files;
        files.truncate(self.config.max_batch_size);
        let accepted = files.len();
        let skipped = submitted - accepted;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        if skipped > 0 {
            warn!(
                "batch of {} exceeds the {} file cap, skipping {}",
                submitted, self.config.max_batch_size, skipped
            );
            let _ = events_tx.send(BatchEvent::Truncated {
                submitted,
                accepted,
                skipped,
            });
        }

        let total = accepted;
        let completed = Arc::new(AtomicUsize::new(0));

        // Synchronous validation: rejected files are born terminal.
        let batch: Vec<ProcessingTask> = files
            .into_iter()
            .map(|file| match validate_source(&file, &self.config) {
                Ok(()) => ProcessingTask::queued(file),
                Err(e) => ProcessingTask::rejected(file, e.to_string()),
            })
            .collect();

        let ids: Vec<TaskId> = batch.iter().map(|t| t.id).collect();
        let queue: VecDeque<TaskId> = batch
            .iter()
            .filter(|t| t.status() == TaskStatus::Queued)
            .map(|t| t.id)
            .collect();

        for task in &batch {
            match task.status() {
                TaskStatus::Queued => {
                    let _ = events_tx.send(BatchEvent::TaskQueued { id: task.id });
                }
                _ => {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    let reason = task
                        .snapshot()
                        .error_reason
                        .unwrap_or_else(|| "validation failed".to_string());
                    debug!("rejected '{}' at submission: {}", task.source.file_name, reason);
                    let _ = events_tx.send(BatchEvent::TaskError {
                        id: task.id,
                        reason,
                        progress: BatchProgress::new(done, total),
                    });
                }
            }
        }

        // Newest batch first, keeping submission order within the batch.
        {
            let mut items = self.items.lock().await;
            let old = std::mem::take(&mut *items);
            let mut combined = batch;
            combined.extend(old);
            *items = combined;
        }

        let worker_count = self.config.max_concurrency.min(queue.len());
        debug!(
            "submitting {} tasks ({} queued) to {} workers",
            accepted,
            queue.len(),
            worker_count
        );

        let queue = Arc::new(Mutex::new(queue));
        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            workers.push(self.spawn_worker(
                worker_id,
                Arc::clone(&queue),
                events_tx.clone(),
                Arc::clone(&completed),
                total,
            ));
        }

        Ok(BatchHandle::new(
            accepted,
            skipped,
            ids,
            events_rx,
            Arc::clone(&self.items),
            workers,
        ))
    }

    fn spawn_worker(
        &self,
        worker_id: usize,
        queue: Arc<Mutex<VecDeque<TaskId>>>,
        events: mpsc::UnboundedSender<BatchEvent>,
        completed: Arc<AtomicUsize>,
        total: usize,
    ) -> tokio::task::JoinHandle<()> {
        let items = Arc::clone(&self.items);
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            loop {
                let id = { queue.lock().await.pop_front() };
                let Some(id) = id else { break };

                let source = {
                    let mut items = items.lock().await;
                    match items.iter_mut().find(|t| t.id == id) {
                        Some(task) => {
                            task.start();
                            task.source.clone()
                        }
                        None => {
                            warn!("queued task {} missing from the task list", id);
                            continue;
                        }
                    }
                };
                let _ = events.send(BatchEvent::TaskStarted { id });
                debug!("worker {} processing '{}'", worker_id, source.file_name);

                let task_config = Arc::clone(&config);
                let task_source = source.clone();
                let result = match tokio::task::spawn_blocking(move || {
                    processing::process(&task_source, &task_config)
                })
                .await
                {
                    Ok(result) => result,
                    Err(e) => Err(PipelineError::processing(format!("task panicked: {e}"))),
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                let progress = BatchProgress::new(done, total);

                let mut items = items.lock().await;
                let Some(task) = items.iter_mut().find(|t| t.id == id) else {
                    warn!("finished task {} missing from the task list", id);
                    continue;
                };
                match result {
                    Ok(outcome) => {
                        let _ = events.send(BatchEvent::TaskDone {
                            id,
                            byte_size: outcome.encoded.byte_size,
                            compression_ratio: outcome.encoded.compression_ratio,
                            resolution_warning: outcome.resolution_warning,
                            progress,
                        });
                        task.complete(outcome.encoded, outcome.resolution_warning);
                    }
                    Err(e) => {
                        warn!("processing failed for '{}': {}", source.file_name, e);
                        let reason = e.to_string();
                        task.fail(reason.clone());
                        let _ = events.send(BatchEvent::TaskError { id, reason, progress });
                    }
                }
            }
            debug!("worker {} exiting, queue drained", worker_id);
        })
    }

    /// Owned snapshot of every tracked task, newest batch first.
    pub async fn snapshot(&self) -> Vec<TaskSnapshot> {
        self.items.lock().await.iter().map(|t| t.snapshot()).collect()
    }

    /// Drops all tracked tasks. The only way items ever leave the list.
    pub async fn clear(&self) {
        self.items.lock().await.clear();
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Default for ThumbnailOptimizer {
    fn default() -> Self {
        // The default configuration is statically valid.
        Self {
            config: Arc::new(PipelineConfig::default()),
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gradient_png;

    fn png_source(name: &str) -> SourceImage {
        SourceImage::new(name, "image/png", gradient_png(320, 180))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_never_exceeds_the_cap() {
        let optimizer = ThumbnailOptimizer::default();
        let files: Vec<_> = (0..10).map(|i| png_source(&format!("f{i}.png"))).collect();

        let mut handle = optimizer.submit(files).await.unwrap();
        let cap = optimizer.config().max_concurrency;
        let ceiling = optimizer.config().output_ceiling_bytes;

        let mut running = 0usize;
        let mut max_running = 0usize;
        let mut done = 0usize;
        while let Some(event) = handle.next_event().await {
            match event {
                BatchEvent::TaskStarted { .. } => {
                    running += 1;
                    max_running = max_running.max(running);
                }
                BatchEvent::TaskDone { byte_size, .. } => {
                    running -= 1;
                    done += 1;
                    assert!(byte_size <= ceiling);
                }
                BatchEvent::TaskError { .. } => running -= 1,
                _ => {}
            }
        }
        assert!(max_running <= cap, "saw {max_running} concurrent tasks");
        assert_eq!(done, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn oversized_batches_are_truncated_and_reported() {
        let optimizer = ThumbnailOptimizer::default();
        let files: Vec<_> = (0..25).map(|i| png_source(&format!("f{i}.png"))).collect();

        let mut handle = optimizer.submit(files).await.unwrap();
        assert_eq!(handle.accepted(), 20);
        assert_eq!(handle.skipped(), 5);

        let truncated = handle.next_event().await.unwrap();
        assert!(matches!(
            truncated,
            BatchEvent::Truncated { submitted: 25, accepted: 20, skipped: 5 }
        ));

        let results = handle.wait().await;
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|r| r.status == TaskStatus::Done));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn one_corrupt_file_does_not_block_its_siblings() {
        let optimizer = ThumbnailOptimizer::default();
        let files = vec![
            png_source("first.png"),
            SourceImage::new("broken.png", "image/png", b"not an image at all".to_vec()),
            png_source("third.png"),
        ];

        let handle = optimizer.submit(files).await.unwrap();
        let results = handle.wait().await;

        let statuses: Vec<TaskStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![TaskStatus::Done, TaskStatus::Error, TaskStatus::Done]
        );
        assert!(results[1].error_reason.as_deref().unwrap().contains("could not open"));
        assert!(results[0].encoded.is_some() && results[2].encoded.is_some());
    }

    #[tokio::test]
    async fn invalid_files_fail_before_any_worker_starts() {
        let optimizer = ThumbnailOptimizer::default();
        let files = vec![
            SourceImage::new("anim.gif", "image/gif", vec![0x47, 0x49, 0x46]),
            png_source("ok.png"),
        ];

        let mut handle = optimizer.submit(files).await.unwrap();

        // The validation rejection is emitted during submission, so it must
        // arrive before any TaskStarted.
        let mut seen_started = false;
        let mut rejection_order_ok = false;
        while let Some(event) = handle.next_event().await {
            match event {
                BatchEvent::TaskStarted { .. } => seen_started = true,
                BatchEvent::TaskError { ref reason, .. } => {
                    assert!(reason.contains("unsupported format"), "{reason}");
                    rejection_order_ok = !seen_started;
                }
                _ => {}
            }
        }
        assert!(rejection_order_ok, "validation error arrived after a worker started");

        let results = handle.wait().await;
        assert_eq!(results[0].status, TaskStatus::Error);
        assert_eq!(results[1].status, TaskStatus::Done);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn task_list_shows_the_newest_batch_first() {
        let optimizer = ThumbnailOptimizer::default();
        optimizer
            .submit(vec![png_source("old.png")])
            .await
            .unwrap()
            .wait()
            .await;
        optimizer
            .submit(vec![png_source("new-a.png"), png_source("new-b.png")])
            .await
            .unwrap()
            .wait()
            .await;

        let names: Vec<String> = optimizer
            .snapshot()
            .await
            .into_iter()
            .map(|s| s.file_name)
            .collect();
        assert_eq!(names, vec!["new-a.png", "new-b.png", "old.png"]);

        optimizer.clear().await;
        assert!(optimizer.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn empty_submissions_are_a_contract_violation() {
        let optimizer = ThumbnailOptimizer::default();
        assert!(optimizer.submit(Vec::new()).await.is_err());
    }
}
