//! Per-file task definition and lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{EncodedResult, SourceImage};

/// Opaque task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of one task.
///
/// Transitions form a straight line with two terminal states:
/// `Queued -> Processing -> Done | Error`. Nothing ever leaves a terminal
/// state and there are no automatic retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Processing,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// One file's journey through the pipeline.
///
/// Owned exclusively by the orchestrator; consumers only ever see
/// [`TaskSnapshot`] copies. Tasks are never removed automatically, they
/// persist in the result list until the caller clears them.
#[derive(Debug)]
pub struct ProcessingTask {
    pub id: TaskId,
    pub source: SourceImage,
    status: TaskStatus,
    encoded: Option<EncodedResult>,
    error_reason: Option<String>,
    resolution_warning: bool,
}

impl ProcessingTask {
    /// Creates a task waiting for a worker slot.
    pub fn queued(source: SourceImage) -> Self {
        Self {
            id: TaskId::new(),
            source,
            status: TaskStatus::Queued,
            encoded: None,
            error_reason: None,
            resolution_warning: false,
        }
    }

    /// Creates a task that failed validation and never entered the queue.
    pub fn rejected(source: SourceImage, reason: String) -> Self {
        Self {
            id: TaskId::new(),
            source,
            status: TaskStatus::Error,
            encoded: None,
            error_reason: Some(reason),
            resolution_warning: false,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Marks the task as picked up by a worker.
    pub fn start(&mut self) {
        debug_assert_eq!(self.status, TaskStatus::Queued, "task started twice");
        self.status = TaskStatus::Processing;
    }

    /// Terminal success transition; the result's ownership moves to the task.
    pub fn complete(&mut self, encoded: EncodedResult, resolution_warning: bool) {
        debug_assert!(!self.status.is_terminal(), "terminal task mutated");
        self.status = TaskStatus::Done;
        self.encoded = Some(encoded);
        self.resolution_warning = resolution_warning;
    }

    /// Terminal failure transition with a user-facing reason.
    pub fn fail(&mut self, reason: String) {
        debug_assert!(!self.status.is_terminal(), "terminal task mutated");
        self.status = TaskStatus::Error;
        self.error_reason = Some(reason);
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            file_name: self.source.file_name.clone(),
            original_size: self.source.byte_size(),
            status: self.status,
            encoded: self.encoded.clone(),
            error_reason: self.error_reason.clone(),
            resolution_warning: self.resolution_warning,
            compression_ratio: self.encoded.as_ref().map(|e| e.compression_ratio),
        }
    }
}

/// Read-only copy of a task's externally visible state.
///
/// Suitable for direct rendering by a UI and for driving downloads; holds
/// the encoded bytes for `Done` tasks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub id: TaskId,
    pub file_name: String,
    pub original_size: u64,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded: Option<EncodedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub resolution_warning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
}
