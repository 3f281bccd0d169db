//! Worker pool consuming the broker channel
//!
//! Each accepted job is executed at least once: failures retry with
//! exponential backoff up to `max_attempts`, and a terminal failure logs the
//! full job context (name, keys, scope) so an operator can replay it — the
//! operations themselves are idempotent, so replay is always safe.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use lotbook_queue::Job;

use crate::propagation;

/// Worker pool configuration
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Number of concurrent worker tasks
    pub workers: usize,
    /// Attempts per job before the failure is terminal
    pub max_attempts: u32,
    /// Initial delay between attempts, doubled after each failure
    pub retry_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Handle to the spawned worker pool
///
/// The pool drains until every queue sender is dropped, then each worker
/// exits; `join` awaits that shutdown.
pub struct JobRunner {
    handles: Vec<JoinHandle<()>>,
}

impl JobRunner {
    /// Spawn `config.workers` tasks consuming `rx`
    pub fn spawn(db: DatabaseConnection, rx: mpsc::Receiver<Job>, config: RunnerConfig) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..config.workers.max(1))
            .map(|worker_id| {
                let db = db.clone();
                let rx = Arc::clone(&rx);
                let config = config.clone();
                tokio::spawn(async move {
                    worker_loop(worker_id, db, rx, config).await;
                })
            })
            .collect();

        Self { handles }
    }

    /// Wait for every worker to finish draining the queue
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    db: DatabaseConnection,
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    config: RunnerConfig,
) {
    debug!(worker_id, "propagation worker started");

    loop {
        let job = rx.lock().await.recv().await;
        let Some(job) = job else {
            debug!(worker_id, "job broker closed, worker exiting");
            break;
        };

        run_job(&db, &job, &config, worker_id).await;
    }
}

async fn run_job(db: &DatabaseConnection, job: &Job, config: &RunnerConfig, worker_id: usize) {
    let mut delay = config.retry_delay;

    for attempt in 1..=config.max_attempts.max(1) {
        match propagation::execute(db, job).await {
            Ok(rewritten) => {
                info!(worker_id, job = job.name(), rewritten, attempt, "job complete");
                return;
            }
            Err(err) if attempt < config.max_attempts => {
                warn!(
                    worker_id,
                    job = job.name(),
                    attempt,
                    error = %err,
                    "job failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => {
                // context for manual replay; the operation is idempotent
                error!(
                    worker_id,
                    job = job.name(),
                    detail = %job.describe(),
                    attempts = config.max_attempts,
                    error = %err,
                    "job failed terminally"
                );
            }
        }
    }
}
