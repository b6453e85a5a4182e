//! # Async Writer
//!
//! Background task that applies writes for async backends in the order the
//! store issued them.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Async Write Path                               │
//! │                                                                         │
//! │  CartStore mutation                                                     │
//! │      │  encode envelope                                                 │
//! │      ▼                                                                  │
//! │  AsyncWriter::set() ──► mpsc (unbounded, FIFO) ──► writer task          │
//! │      │                                               │                  │
//! │      ▼                                               ▼                  │
//! │  returns immediately                  storage.set_item(key, value).await│
//! │                                                      │                  │
//! │                                          Err ──► error! + last_error    │
//! │                                                                         │
//! │  flush() enqueues a marker and waits until the task reaches it.         │
//! │  The task ends once every sender is dropped and the queue is drained.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::{StoreError, StoreResult};
use crate::storage::AsyncStateStorage;

/// Most recent failure reported by the writer task.
pub(crate) type LastWriteError = Arc<Mutex<Option<StoreError>>>;

enum WriteJob {
    Set {
        storage: Arc<dyn AsyncStateStorage>,
        key: String,
        value: String,
    },
    Remove {
        storage: Arc<dyn AsyncStateStorage>,
        key: String,
    },
    Flush(oneshot::Sender<()>),
}

/// Sending half of the writer queue. Clones feed the same task.
#[derive(Clone)]
pub(crate) struct AsyncWriter {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl AsyncWriter {
    /// Spawns the writer task on the current Tokio runtime.
    pub fn spawn(last_error: LastWriteError) -> StoreResult<Self> {
        let handle = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run(rx, last_error));
        debug!("Async storage writer started");
        Ok(AsyncWriter { tx })
    }

    /// True once the task is gone, e.g. its runtime shut down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn set(
        &self,
        storage: Arc<dyn AsyncStateStorage>,
        key: String,
        value: String,
    ) -> StoreResult<()> {
        self.tx
            .send(WriteJob::Set {
                storage,
                key,
                value,
            })
            .map_err(|e| StoreError::WriterClosed(job_key(e.0)))
    }

    pub fn remove(&self, storage: Arc<dyn AsyncStateStorage>, key: String) -> StoreResult<()> {
        self.tx
            .send(WriteJob::Remove { storage, key })
            .map_err(|e| StoreError::WriterClosed(job_key(e.0)))
    }

    /// Resolves once every job queued before this call has been applied.
    pub async fn flush(&self) -> StoreResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(WriteJob::Flush(done_tx))
            .map_err(|_| StoreError::WriterClosed("flush".to_string()))?;
        done_rx
            .await
            .map_err(|_| StoreError::WriterClosed("flush".to_string()))
    }
}

fn job_key(job: WriteJob) -> String {
    match job {
        WriteJob::Set { key, .. } | WriteJob::Remove { key, .. } => key,
        WriteJob::Flush(_) => "flush".to_string(),
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<WriteJob>, last_error: LastWriteError) {
    while let Some(job) = rx.recv().await {
        let (key, result) = match job {
            WriteJob::Set {
                storage,
                key,
                value,
            } => {
                let result = storage.set_item(&key, &value).await;
                (key, result)
            }
            WriteJob::Remove { storage, key } => {
                let result = storage.remove_item(&key).await;
                (key, result)
            }
            WriteJob::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        if let Err(e) = result {
            error!(key = %key, error = %e, "Async cart write failed");
            *last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(e.into());
        }
    }
    debug!("Async storage writer stopped");
}
