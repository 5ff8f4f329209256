//! Shared library for the family recipe catalog services.
//!
//! Holds the domain model and validation rules, the SQLite schema and
//! store, the notification job queue, retry helpers, configuration and
//! the common error type used by recipes-api, recipes-worker and
//! recipes-import.

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod notify;
pub mod retry;

pub use error::{Error, Result};
