//! recipes-worker library - notification delivery worker
//!
//! Drains the notification job queue one job at a time. A failing job
//! goes back to pending until its attempt count reaches the cap, then
//! it is marked failed with the last error recorded. Failures never
//! propagate anywhere else.

use recipes_common::db::{self, MAX_JOB_ATTEMPTS};
use recipes_common::notify::Mailer;
use recipes_common::Result;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Process a single pending job if one exists. Returns true when a job
/// was claimed (delivered, released or failed), false when the queue
/// was empty.
pub async fn process_one(pool: &SqlitePool, mailer: &Mailer) -> Result<bool> {
    let Some(job) = db::claim_next_job(pool).await? else {
        return Ok(false);
    };

    debug!(
        job_id = %job.id,
        operation = job.operation.as_str(),
        attempt = job.attempts,
        "Processing notification job"
    );

    match mailer.send_notification(&job).await {
        Ok(()) => {
            db::mark_job_done(pool, &job.id).await?;
            info!(
                job_id = %job.id,
                recipe = %job.recipe_title,
                operation = job.operation.as_str(),
                "Notification delivered"
            );
        }
        Err(e) if job.attempts >= MAX_JOB_ATTEMPTS => {
            db::mark_job_failed(pool, &job.id, &e.to_string()).await?;
            warn!(
                job_id = %job.id,
                attempts = job.attempts,
                error = %e,
                "Notification failed permanently, giving up"
            );
        }
        Err(e) => {
            db::release_job(pool, &job.id, &e.to_string()).await?;
            warn!(
                job_id = %job.id,
                attempt = job.attempts,
                error = %e,
                "Notification attempt failed, will retry"
            );
        }
    }

    Ok(true)
}

/// Poll loop: drain the queue, then sleep until the next poll. Between
/// retries of the same job at least one poll interval elapses, which is
/// the backoff.
pub async fn run(pool: SqlitePool, mailer: Mailer, poll_interval: Duration) -> Result<()> {
    info!(
        smtp_enabled = mailer.is_enabled(),
        poll_secs = poll_interval.as_secs(),
        "Worker started, listening for notification jobs"
    );

    loop {
        loop {
            match process_one(&pool, &mailer).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    warn!(error = %e, "Job processing error");
                    break;
                }
            }
        }
        tokio::time::sleep(poll_interval).await;
    }
}
