use serde::Serialize;

use crate::core::TaskId;

/// Running counters for one batch, included with every terminal update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    /// Number of tasks that reached a terminal state
    pub completed_tasks: usize,
    /// Total number of tasks accepted into the batch
    pub total_tasks: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
}

impl BatchProgress {
    pub fn new(completed_tasks: usize, total_tasks: usize) -> Self {
        let progress_percentage = if total_tasks > 0 {
            (completed_tasks * 100) / total_tasks
        } else {
            0
        };
        Self {
            completed_tasks,
            total_tasks,
            progress_percentage,
        }
    }
}

/// Live update emitted by the orchestrator while a batch runs.
///
/// Every task reports its completion (success or failure) independently and
/// immediately; consumers never wait for the whole batch to see partial
/// results. The stream ends (the channel closes) once every accepted task is
/// terminal.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BatchEvent {
    /// The submission exceeded the batch cap and was cut down
    Truncated {
        submitted: usize,
        accepted: usize,
        skipped: usize,
    },
    /// A file passed validation and is waiting for a worker
    TaskQueued { id: TaskId },
    /// A worker picked the task up
    TaskStarted { id: TaskId },
    /// Terminal success
    TaskDone {
        id: TaskId,
        byte_size: u64,
        compression_ratio: f64,
        resolution_warning: bool,
        progress: BatchProgress,
    },
    /// Terminal failure, including pre-queue validation rejections
    TaskError {
        id: TaskId,
        reason: String,
        progress: BatchProgress,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_empty_batches() {
        assert_eq!(BatchProgress::new(0, 0).progress_percentage, 0);
        assert_eq!(BatchProgress::new(1, 4).progress_percentage, 25);
        assert_eq!(BatchProgress::new(4, 4).progress_percentage, 100);
    }
}
