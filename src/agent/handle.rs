// ABOUTME: TaskHandle for subagent runs spawned onto the tokio runtime.
// ABOUTME: Provides status polling, waiting, timeout, duration, and cancellation.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use super::TaskResult;
use crate::error::TaskError;

/// Current state of a background subagent run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TaskStatus {
    /// Spawned but not yet polled by the runtime.
    Pending = 0,
    /// Waiting on the model backend.
    Running = 1,
    Completed = 2,
    Failed = 3,
    Cancelled = 4,
}

impl TaskStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskStatus::Pending,
            1 => TaskStatus::Running,
            2 => TaskStatus::Completed,
            3 => TaskStatus::Failed,
            4 => TaskStatus::Cancelled,
            _ => TaskStatus::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Handle to a subagent running in the background.
///
/// Status reads are lock-free. `wait` consumes the handle and yields the
/// run's result; dropping the handle leaves the run going.
pub struct TaskHandle {
    agent_id: String,
    status: Arc<AtomicU8>,
    start_time: Instant,
    end_time: Arc<OnceLock<Instant>>,
    join: JoinHandle<Result<TaskResult, TaskError>>,
}

impl TaskHandle {
    /// Spawn `work` onto the current tokio runtime.
    pub(crate) fn spawn<F>(agent_id: String, work: F) -> Self
    where
        F: Future<Output = Result<TaskResult, TaskError>> + Send + 'static,
    {
        let status = Arc::new(AtomicU8::new(TaskStatus::Pending as u8));
        let end_time = Arc::new(OnceLock::new());

        let task_status = status.clone();
        let task_end = end_time.clone();
        let join = tokio::spawn(async move {
            let _ = transition(&task_status, TaskStatus::Pending, TaskStatus::Running);
            let result = work.await;
            let done = if result.is_ok() {
                TaskStatus::Completed
            } else {
                TaskStatus::Failed
            };
            if transition(&task_status, TaskStatus::Running, done) {
                let _ = task_end.set(Instant::now());
            }
            result
        });

        Self {
            agent_id,
            status,
            start_time: Instant::now(),
            end_time,
            join,
        }
    }

    /// Id of the run; matches `TaskResult::agent_id`.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// True once the run has completed, failed, or been cancelled.
    pub fn is_complete(&self) -> bool {
        self.status().is_terminal()
    }

    /// How long the run has taken so far, or took in total once finished.
    pub fn duration(&self) -> Duration {
        match self.end_time.get() {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Abort the run, abandoning any in-flight request.
    ///
    /// Returns true if the run was still pending or running.
    pub fn cancel(&self) -> bool {
        let cancelled = transition(&self.status, TaskStatus::Pending, TaskStatus::Cancelled)
            || transition(&self.status, TaskStatus::Running, TaskStatus::Cancelled);
        if cancelled {
            let _ = self.end_time.set(Instant::now());
            self.join.abort();
            debug!(agent_id = %self.agent_id, "subagent cancelled");
        }
        cancelled
    }

    /// Wait for the run to finish.
    pub async fn wait(mut self) -> Result<TaskResult, TaskError> {
        let joined = (&mut self.join).await;
        self.finish(joined)
    }

    /// Wait up to `timeout`. On expiry the handle is given back, still running.
    pub async fn wait_timeout(
        mut self,
        timeout: Duration,
    ) -> Result<Result<TaskResult, TaskError>, Self> {
        match tokio::time::timeout(timeout, &mut self.join).await {
            Ok(joined) => Ok(self.finish(joined)),
            Err(_) => Err(self),
        }
    }

    fn finish(
        &self,
        joined: Result<Result<TaskResult, TaskError>, JoinError>,
    ) -> Result<TaskResult, TaskError> {
        if self.status() == TaskStatus::Cancelled {
            return Err(TaskError::Cancelled);
        }
        match joined {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(TaskError::Cancelled),
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }
}

fn transition(status: &AtomicU8, from: TaskStatus, to: TaskStatus) -> bool {
    status
        .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}
