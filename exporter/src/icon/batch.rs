use crate::error::ExportError;
use crate::icon::gen::OutputGenerator;
use crate::icon::job::ExportJob;
use crate::icon::ExportOutcome;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

/// Shared flag that stops a batch from starting further jobs.
#[derive(Debug, Default)]
pub struct Cancellation {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Cancellation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        // Register before checking so a concurrent cancel is not missed
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }

        notified.await;
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound of jobs running at the same time
    pub max_parallel: usize,

    pub cancellation: Arc<Cancellation>,
}

impl BatchOptions {
    pub fn new(max_parallel: usize, cancellation: Arc<Cancellation>) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
            cancellation,
        }
    }
}

#[derive(Debug)]
pub struct JobReport {
    pub job: ExportJob,
    pub result: Result<ExportOutcome, ExportError>,
}

/// Results of a batch in job order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(|r| r.result.is_ok())
    }

    pub fn exported(&self) -> impl Iterator<Item = (&ExportJob, &ExportOutcome)> {
        self.jobs
            .iter()
            .filter_map(|r| r.result.as_ref().ok().map(|o| (&r.job, o)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ExportJob, &ExportError)> {
        self.jobs
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (&r.job, e)))
    }

    pub fn extend(&mut self, other: BatchReport) {
        self.jobs.extend(other.jobs);
    }
}

/// Exports every job into `output_dir`.
///
/// Jobs run on the blocking pool and fail independently. Once the
/// cancellation fires no further job is started, jobs already running are
/// allowed to finish.
pub async fn export(jobs: Vec<ExportJob>, output_dir: &Path, options: &BatchOptions) -> BatchReport {
    let outputs = Arc::new(OutputGenerator::new(output_dir));

    // Jobs create the directory themselves as well, a failure here only
    // surfaces once per job
    if let Err(err) = tokio::fs::create_dir_all(output_dir).await {
        tracing::warn!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            err
        );
    }

    let semaphore = Arc::new(Semaphore::new(options.max_parallel));
    let mut results = jobs.iter().map(|_| None).collect::<Vec<_>>();
    let mut claimed_outputs = HashSet::new();
    let mut running = FuturesUnordered::new();

    for (index, job) in jobs.iter().enumerate() {
        let path = job.output_path(output_dir);
        if !claimed_outputs.insert(path.clone()) {
            results[index] = Some(Err(ExportError::DuplicatedOutput { path }));
            continue;
        }

        let permit = tokio::select! {
            biased;
            _ = options.cancellation.cancelled() => None,
            permit = semaphore.clone().acquire_owned() => permit.ok(),
        };

        let Some(permit) = permit else {
            results[index] = Some(Err(ExportError::Cancelled));
            continue;
        };

        let job = job.clone();
        let outputs = outputs.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            super::export_job(&job, &outputs)
        });

        running.push(async move { (index, task.await) });
    }

    while let Some((index, joined)) = running.next().await {
        results[index] = Some(match joined {
            Ok(result) => result,
            Err(err) => Err(ExportError::Panicked(err.to_string())),
        });
    }

    let jobs = jobs
        .into_iter()
        .zip(results)
        .map(|(job, result)| {
            let result = result.unwrap_or(Err(ExportError::Cancelled));
            match &result {
                Ok(outcome) => tracing::info!("Exported {}", outcome.path.display()),
                Err(ExportError::Cancelled) => tracing::warn!("{}: cancelled", job),
                Err(err) => tracing::error!("{}: {}", job, err),
            }

            JobReport { job, result }
        })
        .collect();

    BatchReport { jobs }
}
