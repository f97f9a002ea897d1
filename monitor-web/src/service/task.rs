//! background task pool
//!
//! A bounded queue feeding a fixed set of workers. `try_submit` never waits and
//! reports [`TaskError::QueueFull`] when the queue is at capacity, `submit`
//! waits for a free slot. `shutdown` stops intake, lets the workers drain the
//! queue for a grace period and then cancels whatever is still queued or running.
//! A task that errors or panics is counted as failed and its worker keeps going.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock as StdRwLock};
use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::adapter::vo::task::TaskStatsVO;
use crate::config::TaskConfig;

pub type TaskId = Uuid;
pub type TaskFuture = BoxFuture<'static, anyhow::Result<()>>;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("task queue is full")]
    QueueFull,
    #[error("task pool is shut down")]
    Closed,
}

struct Job {
    id: TaskId,
    name: String,
    fut: TaskFuture,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
    rejected: AtomicU64,
}

pub struct TaskPool {
    sender: StdRwLock<Option<mpsc::Sender<Job>>>,
    /// cancelled as soon as shutdown starts; stops intake
    closing: CancellationToken,
    /// cancelled when the grace period is over; stops the workers
    token: CancellationToken,
    workers: StdMutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
    worker_count: usize,
    capacity: usize,
}

impl TaskPool {
    /// Spawns the workers on the current tokio runtime.
    pub fn new(config: &TaskConfig) -> Self {
        let worker_count = config.workers.max(1);
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel::<Job>(capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let token = CancellationToken::new();
        let counters = Arc::new(Counters::default());

        let workers = (0..worker_count)
            .map(|idx| {
                tokio::spawn(worker_loop(
                    idx,
                    receiver.clone(),
                    token.child_token(),
                    counters.clone(),
                ))
            })
            .collect();
        info!(workers = worker_count, capacity, "task pool started");

        Self {
            sender: StdRwLock::new(Some(sender)),
            closing: CancellationToken::new(),
            token,
            workers: StdMutex::new(workers),
            counters,
            worker_count,
            capacity,
        }
    }

    fn sender(&self) -> Result<mpsc::Sender<Job>, TaskError> {
        if self.closing.is_cancelled() {
            return Err(TaskError::Closed);
        }
        self.sender
            .read()
            .map_err(|_| TaskError::Closed)?
            .clone()
            .ok_or(TaskError::Closed)
    }

    /// Enqueues without waiting.
    pub fn try_submit<F>(&self, name: impl Into<String>, fut: F) -> Result<TaskId, TaskError>
    where
        F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let sender = self.sender()?;
        let job = Job {
            id: Uuid::new_v4(),
            name: name.into(),
            fut: Box::pin(fut),
        };
        let id = job.id;
        match sender.try_send(job) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                debug!(task_id = %id, "task queued");
                Ok(id)
            }
            Err(TrySendError::Full(job)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(task_id = %job.id, task = %job.name, "task queue full");
                Err(TaskError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(TaskError::Closed),
        }
    }

    /// Enqueues, waiting for a free slot. Fails with [`TaskError::Closed`] if
    /// shutdown starts while waiting; the job is then never queued.
    pub async fn submit<F>(&self, name: impl Into<String>, fut: F) -> Result<TaskId, TaskError>
    where
        F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let sender = self.sender()?;
        let job = Job {
            id: Uuid::new_v4(),
            name: name.into(),
            fut: Box::pin(fut),
        };
        let id = job.id;
        let permit = select! {
            biased;
            _ = self.closing.cancelled() => return Err(TaskError::Closed),
            permit = sender.reserve() => permit.map_err(|_| TaskError::Closed)?,
        };
        // shutdown may have started while the slot was being granted
        if self.closing.is_cancelled() {
            return Err(TaskError::Closed);
        }
        permit.send(job);
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(task_id = %id, "task queued");
        Ok(id)
    }

    pub fn is_closed(&self) -> bool {
        self.closing.is_cancelled() || self.sender.read().map(|s| s.is_none()).unwrap_or(true)
    }

    pub fn stats(&self) -> TaskStatsVO {
        let queued = self
            .sender
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| self.capacity - s.capacity()))
            .unwrap_or(0);
        TaskStatsVO {
            workers: self.worker_count,
            queue_capacity: self.capacity,
            queued,
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Stops intake and waits for the workers. Tasks still queued or running when
    /// `grace` expires are cancelled. Calling it again is a no-op.
    pub async fn shutdown(&self, grace: Duration) {
        self.closing.cancel();
        match self.sender.write() {
            Ok(mut sender) => {
                sender.take();
            }
            Err(e) => error!("task pool sender lock poisoned: {e}"),
        }
        let workers: Vec<JoinHandle<()>> = match self.workers.lock() {
            Ok(mut workers) => workers.drain(..).collect(),
            Err(e) => {
                error!("task pool worker lock poisoned: {e}");
                Vec::new()
            }
        };
        if workers.is_empty() {
            return;
        }
        info!(grace_ms = grace.as_millis() as u64, "task pool shutting down");

        let mut drain = Box::pin(join_all(workers));
        if time::timeout(grace, &mut drain).await.is_err() {
            warn!("task pool grace period expired, cancelling remaining tasks");
            self.token.cancel();
            drain.await;
        }
        self.token.cancel();
        info!("task pool stopped");
    }
}

async fn worker_loop(
    idx: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    token: CancellationToken,
    counters: Arc<Counters>,
) {
    debug!(worker = idx, "worker started");
    loop {
        let job = select! {
            biased;
            _ = token.cancelled() => break,
            job = async { receiver.lock().await.recv().await } => job,
        };
        let Some(job) = job else {
            break;
        };
        let Job { id, name, fut } = job;
        select! {
            biased;
            _ = token.cancelled() => {
                counters.cancelled.fetch_add(1, Ordering::Relaxed);
                warn!(worker = idx, task_id = %id, task = %name, "task cancelled");
                break;
            }
            res = AssertUnwindSafe(fut).catch_unwind() => match res {
                Ok(Ok(())) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    debug!(worker = idx, task_id = %id, task = %name, "task done");
                }
                Ok(Err(e)) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(worker = idx, task_id = %id, task = %name, "task failed: {:?}", e);
                }
                Err(panic) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        worker = idx,
                        task_id = %id,
                        task = %name,
                        "task panicked: {}",
                        panic_message(&*panic)
                    );
                }
            }
        }
    }

    // anything left in the queue after cancellation is dropped unrun
    if token.is_cancelled() {
        let mut receiver = receiver.lock().await;
        receiver.close();
        while let Ok(job) = receiver.try_recv() {
            counters.cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(worker = idx, task_id = %job.id, task = %job.name, "queued task dropped");
        }
    }
    debug!(worker = idx, "worker stopped");
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn config(workers: usize, queue_capacity: usize) -> TaskConfig {
        TaskConfig {
            workers,
            queue_capacity,
            shutdown_grace_secs: 1,
        }
    }

    #[tokio::test]
    async fn runs_every_submitted_task() {
        let pool = TaskPool::new(&config(3, 16));
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let done = done.clone();
            pool.submit("count", async move {
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();
        }
        pool.shutdown(Duration::from_secs(5)).await;
        assert_eq!(done.load(Ordering::SeqCst), 10);
        let stats = pool.stats();
        assert_eq!(stats.submitted, 10);
        assert_eq!(stats.completed, 10);
        assert_eq!(stats.cancelled, 0);
    }

    #[tokio::test]
    async fn failed_task_does_not_stop_worker() {
        let pool = TaskPool::new(&config(1, 4));
        pool.try_submit("boom", async { Err::<(), _>(anyhow::anyhow!("boom")) })
            .unwrap();
        pool.try_submit("ok", async { Ok(()) }).unwrap();
        pool.shutdown(Duration::from_secs(5)).await;
        let stats = pool.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn panicking_task_does_not_stop_worker() {
        let pool = TaskPool::new(&config(1, 4));
        pool.try_submit("panic", async { panic!("boom") }).unwrap();
        time::sleep(Duration::from_millis(100)).await;

        // the only worker is still alive and the queue still open
        assert!(!pool.is_closed());
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        pool.try_submit("ok", async move {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        pool.shutdown(Duration::from_secs(5)).await;

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        let stats = pool.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.cancelled, 0);
    }

    /// One worker parked on a task and the single queue slot taken.
    async fn saturated_pool() -> (Arc<TaskPool>, Arc<Notify>) {
        let pool = Arc::new(TaskPool::new(&config(1, 1)));
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (s, r) = (started.clone(), release.clone());
        pool.try_submit("block", async move {
            s.notify_one();
            r.notified().await;
            Ok(())
        })
        .unwrap();
        started.notified().await;
        pool.try_submit("queued", async { Ok(()) }).unwrap();
        (pool, release)
    }

    #[tokio::test]
    async fn submit_waits_for_free_slot() {
        let (pool, release) = saturated_pool().await;
        let ran = Arc::new(AtomicUsize::new(0));

        let (p, r) = (pool.clone(), ran.clone());
        let waiting = tokio::spawn(async move {
            p.submit("late", async move {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
        });
        time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        release.notify_one();
        assert!(waiting.await.unwrap().is_ok());
        pool.shutdown(Duration::from_secs(5)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(pool.stats().completed, 3);
    }

    #[tokio::test]
    async fn shutdown_releases_blocked_submit() {
        let (pool, release) = saturated_pool().await;
        let ran = Arc::new(AtomicUsize::new(0));

        let (p, r) = (pool.clone(), ran.clone());
        let waiting = tokio::spawn(async move {
            p.submit("late", async move {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
        });
        time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        // the waiter is refused as soon as shutdown starts, before the grace
        // period runs out and before any slot frees up
        let shutdown = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.shutdown(Duration::from_secs(5)).await })
        };
        assert_eq!(
            time::timeout(Duration::from_secs(1), waiting)
                .await
                .unwrap()
                .unwrap(),
            Err(TaskError::Closed)
        );

        release.notify_one();
        shutdown.await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        let stats = pool.stats();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.completed, 2);
    }

    #[tokio::test]
    async fn try_submit_reports_full_queue() {
        let pool = TaskPool::new(&config(1, 1));
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        let (s, r) = (started.clone(), release.clone());
        pool.try_submit("block", async move {
            s.notify_one();
            r.notified().await;
            Ok(())
        })
        .unwrap();
        // worker holds the first task, the queue slot takes the second
        started.notified().await;
        pool.try_submit("queued", async { Ok(()) }).unwrap();
        assert_eq!(
            pool.try_submit("overflow", async { Ok(()) }),
            Err(TaskError::QueueFull)
        );
        assert_eq!(pool.stats().rejected, 1);

        release.notify_one();
        pool.shutdown(Duration::from_secs(5)).await;
        assert_eq!(pool.stats().completed, 2);
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_closed() {
        let pool = TaskPool::new(&config(2, 2));
        pool.shutdown(Duration::from_millis(100)).await;
        assert!(pool.is_closed());
        assert_eq!(
            pool.try_submit("late", async { Ok(()) }),
            Err(TaskError::Closed)
        );
        assert_eq!(
            pool.submit("late", async { Ok(()) }).await,
            Err(TaskError::Closed)
        );
        // second shutdown returns immediately
        pool.shutdown(Duration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn shutdown_cancels_after_grace() {
        let pool = TaskPool::new(&config(1, 4));
        let finished = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let finished = finished.clone();
            pool.try_submit("slow", async move {
                time::sleep(Duration::from_secs(30)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }
        pool.shutdown(Duration::from_millis(50)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        let stats = pool.stats();
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.cancelled, 3);
    }
}
