//! Per-category write queues.
//!
//! Each category gets a single worker task draining a FIFO channel, so at most one queued task
//! per category runs at a time while different categories proceed in parallel. The registry is
//! owned by whoever constructs it (normally a `RecordRepository`); nothing is process-global.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use asset_model::name_casefold;
use tokio::sync::{mpsc, oneshot};

use crate::{Result, StoreError};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Default)]
pub struct WriteSerializer {
    queues: Mutex<HashMap<String, mpsc::UnboundedSender<Job>>>,
}

impl WriteSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` behind every task already queued for `category`.
    ///
    /// The returned handle resolves with the task's result. A failed task is logged and the queue
    /// moves on; a panicking task resolves its handle to [`StoreError::TaskAborted`]. Category
    /// names are compared case-insensitively.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_lock<F, T>(&self, category: &str, task: F) -> WriteHandle<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let label = category.to_string();
        let job_label = label.clone();
        let job: Job = Box::pin(async move {
            let result = task.await;
            if let Err(err) = &result {
                log::error!("queued task for category `{job_label}` failed: {err}");
            }
            // The caller may have dropped its handle; the task still ran to completion.
            let _ = tx.send(result);
        });
        self.enqueue(name_casefold(category), job);
        WriteHandle {
            category: label,
            rx,
        }
    }

    fn enqueue(&self, key: String, job: Job) {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);
        let job = match queues.get(&key) {
            Some(sender) => match sender.send(job) {
                Ok(()) => return,
                Err(mpsc::error::SendError(job)) => job,
            },
            None => job,
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is alive until the worker below exits, so this send can't fail.
        let _ = sender.send(job);
        tokio::spawn(run_queue(key.clone(), receiver));
        queues.insert(key, sender);
    }

    /// Number of categories that have had a queue started.
    pub fn queue_count(&self) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn run_queue(category: String, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        // Each job runs as its own task so a panic is contained to that job.
        if let Err(err) = tokio::spawn(job).await {
            log::error!("queued task for category `{category}` panicked: {err}");
        }
    }
}

/// Completion handle for a task queued with [`WriteSerializer::with_lock`].
#[derive(Debug)]
pub struct WriteHandle<T> {
    category: String,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for WriteHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(StoreError::TaskAborted {
                    category: this.category.clone(),
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn tasks_for_one_category_never_overlap() {
        let serializer = WriteSerializer::new();
        let in_progress = Arc::new(AtomicBool::new(false));
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let in_progress = Arc::clone(&in_progress);
                let order = Arc::clone(&order);
                // Alternate the case of the name; both spellings share a queue.
                let category = if i % 2 == 0 { "Weir" } else { "WEIR" };
                serializer.with_lock(category, async move {
                    assert!(
                        !in_progress.swap(true, Ordering::SeqCst),
                        "two writers active for one category"
                    );
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    order.lock().unwrap().push(i);
                    in_progress.store(false, Ordering::SeqCst);
                    Ok(i)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), i);
        }
        assert_eq!(*order.lock().unwrap(), (0..8).collect::<Vec<_>>());
        assert_eq!(serializer.queue_count(), 1);
    }

    #[tokio::test]
    async fn different_categories_run_concurrently() {
        let serializer = WriteSerializer::new();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = ["Weir", "Cableway"]
            .into_iter()
            .map(|category| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                serializer.with_lock(category, async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_and_panics_do_not_stall_the_queue() {
        let serializer = WriteSerializer::new();

        let failed = serializer.with_lock("Weir", async {
            Err::<(), _>(StoreError::MissingWorkbook {
                category: "Weir".to_string(),
            })
        });
        let panicked = serializer.with_lock("Weir", async {
            if true {
                panic!("boom");
            }
            Ok(())
        });
        let next = serializer.with_lock("Weir", async { Ok("still running") });

        assert!(matches!(
            failed.await,
            Err(StoreError::MissingWorkbook { .. })
        ));
        assert!(matches!(
            panicked.await,
            Err(StoreError::TaskAborted { ref category }) if category == "Weir"
        ));
        assert_eq!(next.await.unwrap(), "still running");
    }
}
