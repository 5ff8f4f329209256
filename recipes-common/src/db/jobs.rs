//! Notification job queue
//!
//! Mutations enqueue a row here after they commit; the worker process
//! claims one pending job at a time and delivers the email. Delivery is
//! at-least-once with a bounded attempt count; exhausted jobs are marked
//! failed with the last error recorded and are never retried again.

use crate::model::Recipe;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum delivery attempts before a job is marked failed
pub const MAX_JOB_ATTEMPTS: i64 = 3;

/// Mutation kind a notification describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
    Deleted,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Created => "created",
            Operation::Updated => "updated",
            Operation::Deleted => "deleted",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created" => Ok(Operation::Created),
            "updated" => Ok(Operation::Updated),
            "deleted" => Ok(Operation::Deleted),
            other => Err(format!("Unknown operation: {}", other)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue entry lifecycle. `Claimed` marks a job a worker currently
/// holds; it leaves that state via done, failed or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Claimed,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Claimed => "claimed",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }
}

/// A claimed notification job
#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub id: String,
    pub operation: Operation,
    pub recipe_id: String,
    pub recipe_title: String,
    pub actor: String,
    /// JSON snapshot of the recipe at mutation time (deletes carry the
    /// pre-deletion state)
    pub payload: Option<Recipe>,
    pub attempts: i64,
}

/// Record a notification job for a completed mutation.
///
/// Notifications are fire-and-forget: callers log and swallow errors
/// from this function rather than failing the mutation.
pub async fn enqueue_notification(
    pool: &SqlitePool,
    operation: Operation,
    recipe: &Recipe,
    actor: &str,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO notification_jobs (
            id, operation, recipe_id, recipe_title, actor,
            payload, status, attempts, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, 'pending', 0, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(operation.as_str())
    .bind(&recipe.id)
    .bind(&recipe.title)
    .bind(actor)
    .bind(serde_json::to_string(recipe)?)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Claim the oldest pending job, marking it claimed and incrementing
/// its attempt counter in one atomic statement so concurrent workers
/// never hold the same job. Returns None when the queue is empty.
pub async fn claim_next_job(pool: &SqlitePool) -> Result<Option<NotificationJob>> {
    let row = sqlx::query(
        r#"
        UPDATE notification_jobs
        SET status = 'claimed', attempts = attempts + 1, updated_at = ?
        WHERE id = (
            SELECT id FROM notification_jobs
            WHERE status = 'pending'
            ORDER BY created_at
            LIMIT 1
        )
        RETURNING id, operation, recipe_id, recipe_title, actor, payload, attempts
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let id: String = row.try_get("id")?;
    let attempts: i64 = row.try_get("attempts")?;

    let operation_raw: String = row.try_get("operation")?;
    let operation = Operation::from_str(&operation_raw).map_err(Error::Internal)?;
    let payload: Option<Recipe> = match row.try_get::<Option<String>, _>("payload")? {
        Some(json) => Some(serde_json::from_str(&json)?),
        None => None,
    };

    Ok(Some(NotificationJob {
        id,
        operation,
        recipe_id: row.try_get("recipe_id")?,
        recipe_title: row.try_get("recipe_title")?,
        actor: row.try_get("actor")?,
        payload,
        attempts,
    }))
}

/// Mark a job delivered
pub async fn mark_job_done(pool: &SqlitePool, job_id: &str) -> Result<()> {
    set_status(pool, job_id, JobStatus::Done, None).await
}

/// Mark a job permanently failed, recording the final error
pub async fn mark_job_failed(pool: &SqlitePool, job_id: &str, error: &str) -> Result<()> {
    set_status(pool, job_id, JobStatus::Failed, Some(error)).await
}

/// Return a failed attempt to the queue for a later retry
pub async fn release_job(pool: &SqlitePool, job_id: &str, error: &str) -> Result<()> {
    set_status(pool, job_id, JobStatus::Pending, Some(error)).await
}

async fn set_status(
    pool: &SqlitePool,
    job_id: &str,
    status: JobStatus,
    error: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "UPDATE notification_jobs SET status = ?, last_error = ?, updated_at = ? WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(error)
    .bind(Utc::now().to_rfc3339())
    .bind(job_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Count jobs in a given state (used by tests and the worker's idle log)
pub async fn count_jobs_with_status(pool: &SqlitePool, status: JobStatus) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification_jobs WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
