//! Bounded parallel task execution.
//!
//! The orchestrator runs one task per resolved target through a
//! [`TaskGroup`]: at most `parallelism` tasks run at once, and the group is
//! fail-fast-but-drain. The first error is recorded and returned from
//! [`TaskGroup::wait`]; tasks that were already running are awaited to
//! completion rather than interrupted, and tasks still queued behind the
//! parallelism limit are skipped. There is no hard-cancellation primitive
//! for in-flight tasks; that is a known limitation of the model.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Default parallelism for build execution.
pub fn default_parallelism() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

/// A semaphore-bounded group of fallible tasks.
#[derive(Debug)]
pub struct TaskGroup<E> {
  semaphore: Arc<Semaphore>,
  failed: Arc<AtomicBool>,
  tasks: JoinSet<Result<(), E>>,
}

impl<E: Send + 'static> TaskGroup<E> {
  pub fn new() -> Self {
    Self::with_parallelism(default_parallelism())
  }

  pub fn with_parallelism(parallelism: usize) -> Self {
    Self {
      semaphore: Arc::new(Semaphore::new(parallelism.max(1))),
      failed: Arc::new(AtomicBool::new(false)),
      tasks: JoinSet::new(),
    }
  }

  /// Schedule a task on the group.
  ///
  /// The task starts once a parallelism permit is available. If another task
  /// has failed by then, this one is skipped without running.
  pub fn spawn<F>(&mut self, task: F)
  where
    F: Future<Output = Result<(), E>> + Send + 'static,
  {
    let semaphore = Arc::clone(&self.semaphore);
    let failed = Arc::clone(&self.failed);
    self.tasks.spawn(async move {
      let Ok(_permit) = semaphore.acquire_owned().await else {
        // The semaphore is never closed while the group is alive.
        return Ok(());
      };
      if failed.load(Ordering::SeqCst) {
        debug!("skipping task, group already failed");
        return Ok(());
      }
      let result = task.await;
      if result.is_err() {
        failed.store(true, Ordering::SeqCst);
      }
      result
    });
  }

  /// Wait for every scheduled task and return the first recorded error.
  ///
  /// Tasks already running when a failure occurs are drained to completion.
  /// A panicking task resurfaces its panic here.
  pub async fn wait(mut self) -> Result<(), E> {
    let mut first_error = None;
    while let Some(joined) = self.tasks.join_next().await {
      match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
          if first_error.is_none() {
            first_error = Some(e);
          }
        }
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        // Tasks are never aborted, so other join errors cannot occur.
        Err(_) => {}
      }
    }
    match first_error {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}

impl<E: Send + 'static> Default for TaskGroup<E> {
  fn default() -> Self {
    Self::new()
  }
}
