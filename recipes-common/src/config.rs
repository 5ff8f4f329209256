//! Environment-driven configuration
//!
//! The binaries take their primary settings (database path, bind
//! address) as clap flags with env fallbacks; this module covers the
//! optional SMTP block shared by the API and the worker. Absence of
//! SMTP settings disables delivery, never startup.

use crate::{Error, Result};

/// SMTP settings for notification email
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// From address; defaults to the SMTP user
    pub from: String,
    /// Recipient list from NOTIFICATION_EMAILS (comma-separated)
    pub recipients: Vec<String>,
}

impl SmtpConfig {
    /// Load from the environment. Returns Ok(None) when the required
    /// variables are absent (notifications disabled); Err only when a
    /// present variable is malformed.
    pub fn from_env() -> Result<Option<Self>> {
        let user = match std::env::var("SMTP_USER") {
            Ok(v) if !v.is_empty() => v,
            _ => return Ok(None),
        };
        let pass = std::env::var("SMTP_PASS").unwrap_or_default();
        if pass.is_empty() {
            return Ok(None);
        }

        let recipients: Vec<String> = std::env::var("NOTIFICATION_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if recipients.is_empty() {
            return Ok(None);
        }

        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid SMTP_PORT: {}", raw)))?,
            Err(_) => 587,
        };
        let from = std::env::var("SMTP_FROM").unwrap_or_else(|_| user.clone());

        Ok(Some(SmtpConfig {
            host,
            port,
            user,
            pass,
            from,
            recipients,
        }))
    }
}
