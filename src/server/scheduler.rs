//! Daily pipeline run via tokio-cron-scheduler.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::pipeline::Pipeline;
use crate::{JobscoutError, Result};

/// Start a scheduler that runs [`Pipeline::run_scheduled`] on `cron` (UTC).
///
/// A failed run is logged and the schedule carries on. The returned handle
/// must be kept alive; call `shutdown()` on it to stop.
pub async fn start_scheduler(pipeline: Arc<Pipeline>, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = pipeline.clone();
        Box::pin(async move {
            match pipeline.run_scheduled().await {
                Ok(report) => info!(
                    found = report.found,
                    new = report.new_items.len(),
                    emails_sent = report.emails_sent,
                    "daily run finished"
                ),
                Err(e) => error!(error = %e, "daily run failed"),
            }
        })
    })
    .map_err(|e| JobscoutError::Scheduler(format!("invalid schedule {cron:?}: {e}")))?;

    scheduler.add(job).await.map_err(scheduler_error)?;
    scheduler.start().await.map_err(scheduler_error)?;

    info!(cron, "scheduler started");
    Ok(scheduler)
}

fn scheduler_error(e: tokio_cron_scheduler::JobSchedulerError) -> JobscoutError {
    JobscoutError::Scheduler(e.to_string())
}
