//! Database access layer: schema initialization, recipe store and the
//! notification job queue. All services share this one SQLite database.

mod init;
mod jobs;
mod store;

pub use init::{create_schema, init_database};
pub use jobs::{
    claim_next_job, count_jobs_with_status, enqueue_notification, mark_job_done, mark_job_failed,
    release_job, JobStatus, NotificationJob, Operation, MAX_JOB_ATTEMPTS,
};
pub use store::{delete_recipe, fetch_recipe, insert_recipe, search_recipes, update_recipe};
