//! Lifetime-scoped background tasks.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::error::ViewModelError;

/// Task group owned by a view-model.
///
/// Work launched here runs on the runtime that was current when the scope
/// was created. Dropping the scope (or calling [`cancel`](Self::cancel))
/// aborts whatever has not finished yet; launched work never outlives its
/// owner.
#[derive(Debug)]
pub struct ViewModelScope {
    name: String,
    handle: Handle,
    tasks: Mutex<JoinSet<()>>,
    running: Arc<watch::Sender<usize>>,
}

/// Decrements the running count when a task completes or is aborted.
struct RunningGuard(Arc<watch::Sender<usize>>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl ViewModelScope {
    /// Create a scope bound to the current tokio runtime.
    pub fn new(name: impl Into<String>) -> Result<Self, ViewModelError> {
        let handle = Handle::try_current().map_err(|_| ViewModelError::NoRuntime)?;
        let (running, _) = watch::channel(0);
        Ok(Self {
            name: name.into(),
            handle,
            tasks: Mutex::new(JoinSet::new()),
            running: Arc::new(running),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Launch fire-and-forget work tied to this scope.
    ///
    /// [`idle`](Self::idle) waits for work launched here.
    pub fn launch<F>(&self, label: &'static str, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.running.send_modify(|count| *count += 1);
        let guard = RunningGuard(Arc::clone(&self.running));
        self.spawn(label, async move {
            let _guard = guard;
            work.await;
        });
    }

    /// Launch a long-lived task, such as a live query pump.
    ///
    /// [`idle`](Self::idle) does not wait for it; it still ends with the
    /// scope.
    pub fn launch_pump<F>(&self, label: &'static str, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(label, work);
    }

    fn spawn<F>(&self, label: &'static str, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock_tasks();
        self.reap(&mut tasks);
        tasks.spawn_on(work, &self.handle);
        tracing::debug!(scope = %self.name, task = label, "launched");
    }

    /// Number of [`launch`](Self::launch)ed tasks that have neither finished
    /// nor been aborted.
    pub fn active(&self) -> usize {
        *self.running.borrow()
    }

    /// Wait until every [`launch`](Self::launch)ed task has finished,
    /// including tasks launched while waiting.
    pub async fn idle(&self) {
        let mut running = self.running.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = running.wait_for(|count| *count == 0).await;
    }

    /// Abort every task that is still running.
    pub fn cancel(&self) {
        let mut tasks = self.lock_tasks();
        if !tasks.is_empty() {
            tracing::debug!(scope = %self.name, pending = tasks.len(), "cancelling");
        }
        tasks.abort_all();
    }

    fn reap(&self, tasks: &mut JoinSet<()>) {
        while let Some(result) = tasks.try_join_next() {
            if let Err(err) = result {
                if err.is_panic() {
                    tracing::warn!(scope = %self.name, error = %err, "task panicked");
                }
            }
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        // A panic while holding the lock leaves the set itself intact.
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for ViewModelScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn requires_a_runtime() {
        let err = ViewModelScope::new("orphan").unwrap_err();
        assert_eq!(err, ViewModelError::NoRuntime);
    }

    #[tokio::test]
    async fn idle_waits_for_launched_work() {
        let scope = ViewModelScope::new("test").unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = done.clone();
            scope.launch("count", async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        scope.idle().await;
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(scope.active(), 0);
    }

    #[tokio::test]
    async fn dropping_the_scope_aborts_pending_work() {
        let scope = ViewModelScope::new("test").unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        let flag = done.clone();
        scope.launch("slow", async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(scope.active(), 1);

        drop(scope);
        tokio::task::yield_now().await;

        assert_eq!(done.load(Ordering::SeqCst), 0);
        // The aborted task released its clone of the counter.
        tokio::time::timeout(Duration::from_secs(1), async {
            while Arc::strong_count(&done) > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn idle_ignores_pumps() {
        let scope = ViewModelScope::new("test").unwrap();
        scope.launch_pump("forever", std::future::pending());

        tokio::time::timeout(Duration::from_secs(1), scope.idle())
            .await
            .unwrap();
        assert_eq!(scope.active(), 0);
    }

    #[tokio::test]
    async fn cancel_leaves_the_scope_usable() {
        let scope = ViewModelScope::new("test").unwrap();
        scope.launch("slow", std::future::pending());
        scope.cancel();
        scope.idle().await;

        let done = Arc::new(AtomicUsize::new(0));
        let flag = done.clone();
        scope.launch("quick", async move {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        scope.idle().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
