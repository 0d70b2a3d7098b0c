use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    index::{IndexError, IndexTask, Indexer},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, SyncSender, TrySendError},
    },
    thread::{self, JoinHandle},
};
use thiserror::Error as ThisError;

///
/// OverflowPolicy
/// What `submit` does when the queue is full.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for queue space; no update is lost.
    #[default]
    Block,

    /// Fail with `SubmitError::QueueFull`.
    Reject,
}

///
/// ExecutorOptions
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorOptions {
    pub workers: usize,
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
}

impl ExecutorOptions {
    pub const DEFAULT_WORKERS: usize = 2;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

    pub const fn validate(&self) -> Result<(), IndexError> {
        if self.workers == 0 {
            return Err(IndexError::InvalidOptions("workers must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(IndexError::InvalidOptions(
                "queue_capacity must be at least 1",
            ));
        }

        Ok(())
    }
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            workers: Self::DEFAULT_WORKERS,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

///
/// SubmitError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum SubmitError {
    #[error("index queue is full")]
    QueueFull,

    #[error("index executor is shut down")]
    ShutDown,
}

impl From<SubmitError> for InternalError {
    fn from(err: SubmitError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Index, err.to_string())
    }
}

///
/// ExecutorStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ExecutorStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub rejected: u64,
}

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

///
/// IndexExecutor
///
/// Bounded worker pool in front of the indexer. Tasks go through a
/// `sync_channel` of `queue_capacity` slots shared by `workers` threads.
/// Failed tasks are logged and counted, never retried.
///

pub struct IndexExecutor {
    sender: Mutex<Option<SyncSender<IndexTask>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<Counters>,
    overflow: OverflowPolicy,
}

impl IndexExecutor {
    /// Start the worker threads.
    pub fn start(indexer: Arc<dyn Indexer>, options: ExecutorOptions) -> Result<Self, IndexError> {
        options.validate()?;

        let (tx, rx) = mpsc::sync_channel(options.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(Counters::default());

        let mut workers = Vec::with_capacity(options.workers);
        for n in 0..options.workers {
            let rx = Arc::clone(&rx);
            let indexer = Arc::clone(&indexer);
            let counters = Arc::clone(&counters);

            let handle = thread::Builder::new()
                .name(format!("docmap-index-{n}"))
                .spawn(move || work(&rx, indexer.as_ref(), &counters))
                .map_err(|err| IndexError::Spawn(err.to_string()))?;
            workers.push(handle);
        }

        tracing::debug!(
            workers = options.workers,
            queue_capacity = options.queue_capacity,
            overflow = ?options.overflow,
            "index executor started"
        );

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            counters,
            overflow: options.overflow,
        })
    }

    /// Queue `task` according to the overflow policy.
    pub fn submit(&self, task: IndexTask) -> Result<(), SubmitError> {
        // a blocked send must not hold the lock
        let Some(sender) = self.sender.lock().clone() else {
            return Err(SubmitError::ShutDown);
        };

        let sent = match self.overflow {
            OverflowPolicy::Block => sender.send(task).map_err(|_| SubmitError::ShutDown),
            OverflowPolicy::Reject => match sender.try_send(task) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(task)) => {
                    self.counters.rejected.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!(
                        entity = task.entity().model().path,
                        id = task.id(),
                        "index queue full, task rejected"
                    );
                    Err(SubmitError::QueueFull)
                }
                Err(TrySendError::Disconnected(_)) => Err(SubmitError::ShutDown),
            },
        };

        if sent.is_ok() {
            self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        }

        sent
    }

    #[must_use]
    pub fn stats(&self) -> ExecutorStats {
        ExecutorStats {
            submitted: self.counters.submitted.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            rejected: self.counters.rejected.load(Ordering::SeqCst),
        }
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Close the queue, let the workers drain it, and join them.
    /// Later submissions fail with `SubmitError::ShutDown`.
    pub fn shutdown(&self) -> ExecutorStats {
        drop(self.sender.lock().take());

        let workers = std::mem::take(&mut *self.workers.lock());
        if !workers.is_empty() {
            for handle in workers {
                if handle.join().is_err() {
                    tracing::error!("index worker panicked");
                }
            }
            tracing::debug!("index executor stopped");
        }

        self.stats()
    }
}

impl Drop for IndexExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn work(rx: &Mutex<Receiver<IndexTask>>, indexer: &dyn Indexer, counters: &Counters) {
    loop {
        // lock only for the receive
        let received = rx.lock().recv();
        let Ok(task) = received else {
            break;
        };

        match task.run(indexer) {
            Ok(outcome) => {
                counters.completed.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(
                    entity = task.entity().model().path,
                    id = task.id(),
                    ?outcome,
                    "index task done"
                );
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!(
                    entity = task.entity().model().path,
                    id = task.id(),
                    error = %err,
                    "index task failed"
                );
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        index::tests::RecordingIndexer, model::entity::EntityModel, test_fixtures::Article,
        traits::Entity,
    };
    use std::sync::mpsc::{Sender, channel};

    fn task(id: &str) -> IndexTask {
        let entity = Article {
            id: id.into(),
            published: true,
            ..Article::default()
        };

        IndexTask::new(Box::new(entity), id)
    }

    ///
    /// GatedIndexer
    /// Announces each update, then waits for a release.
    ///

    struct GatedIndexer {
        started: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl Indexer for GatedIndexer {
        fn update(&self, _: &dyn Entity) -> Result<(), IndexError> {
            self.started.lock().send(()).ok();
            self.release.lock().recv().ok();

            Ok(())
        }

        fn remove(&self, _: &'static EntityModel, _: &str) -> Result<(), IndexError> {
            Ok(())
        }
    }

    struct FailingIndexer;

    impl Indexer for FailingIndexer {
        fn update(&self, _: &dyn Entity) -> Result<(), IndexError> {
            Err(IndexError::Backend("offline".into()))
        }

        fn remove(&self, _: &'static EntityModel, _: &str) -> Result<(), IndexError> {
            Err(IndexError::Backend("offline".into()))
        }
    }

    #[test]
    fn tasks_are_drained_on_shutdown() {
        let indexer = Arc::new(RecordingIndexer::default());
        let executor = IndexExecutor::start(
            Arc::clone(&indexer) as Arc<dyn Indexer>,
            ExecutorOptions::default(),
        )
        .unwrap();

        for id in ["A1", "A2", "A3"] {
            executor.submit(task(id)).unwrap();
        }
        let stats = executor.shutdown();

        assert_eq!(stats.submitted, 3);
        assert_eq!(stats.completed, 3);
        assert_eq!(
            indexer.sorted_calls(),
            ["update:article:A1", "update:article:A2", "update:article:A3"]
        );
        assert!(executor.is_shut_down());
        assert_eq!(executor.submit(task("A4")), Err(SubmitError::ShutDown));
    }

    #[test]
    fn reject_policy_fails_fast_when_full() {
        let (started_tx, started_rx) = channel();
        let (release_tx, release_rx) = channel();
        let indexer = GatedIndexer {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        };
        let options = ExecutorOptions {
            workers: 1,
            queue_capacity: 1,
            overflow: OverflowPolicy::Reject,
        };
        let executor = IndexExecutor::start(Arc::new(indexer), options).unwrap();

        // first task occupies the worker, second fills the queue
        executor.submit(task("A1")).unwrap();
        started_rx.recv().unwrap();
        executor.submit(task("A2")).unwrap();

        assert_eq!(executor.submit(task("A3")), Err(SubmitError::QueueFull));

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        let stats = executor.shutdown();

        assert_eq!(
            stats,
            ExecutorStats {
                submitted: 2,
                completed: 2,
                failed: 0,
                rejected: 1,
            }
        );
    }

    #[test]
    fn indexer_failures_are_counted() {
        let executor =
            IndexExecutor::start(Arc::new(FailingIndexer), ExecutorOptions::default()).unwrap();

        executor.submit(task("A1")).unwrap();
        let stats = executor.shutdown();

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 0);
    }

    #[test]
    fn zero_workers_are_refused() {
        let options = ExecutorOptions {
            workers: 0,
            ..ExecutorOptions::default()
        };

        let err = IndexExecutor::start(Arc::new(FailingIndexer), options)
            .err()
            .unwrap();

        assert!(matches!(err, IndexError::InvalidOptions(_)));
    }

    #[test]
    fn overflow_policy_reads_lowercase() {
        let options: ExecutorOptions =
            serde_json::from_str(r#"{"workers": 4, "overflow": "reject"}"#).unwrap();

        assert_eq!(options.workers, 4);
        assert_eq!(options.queue_capacity, ExecutorOptions::DEFAULT_QUEUE_CAPACITY);
        assert_eq!(options.overflow, OverflowPolicy::Reject);
    }
}
