//! Notification email rendering and SMTP delivery
//!
//! Delivery is best-effort: the worker retries a bounded number of
//! times and then gives up; nothing here ever propagates back to an
//! HTTP response.

use crate::config::SmtpConfig;
use crate::db::{NotificationJob, Operation};
use crate::{Error, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP mailer; `None` inner transport means delivery is disabled
pub struct Mailer {
    inner: Option<SmtpMailer>,
}

struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl Mailer {
    /// Build from optional SMTP settings
    pub fn new(config: Option<SmtpConfig>) -> Result<Self> {
        let Some(config) = config else {
            return Ok(Mailer { inner: None });
        };

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| Error::Config(format!("Invalid SMTP_FROM address: {}", e)))?;

        let mut recipients = Vec::with_capacity(config.recipients.len());
        for addr in &config.recipients {
            let mailbox: Mailbox = addr
                .parse()
                .map_err(|e| Error::Config(format!("Invalid notification address {}: {}", addr, e)))?;
            recipients.push(mailbox);
        }

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| Error::Config(format!("SMTP relay setup failed: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(config.user, config.pass))
            .build();

        Ok(Mailer {
            inner: Some(SmtpMailer {
                transport,
                from,
                recipients,
            }),
        })
    }

    /// True when SMTP is configured
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Deliver the notification for a claimed job. A disabled mailer
    /// succeeds without sending so the queue still drains.
    pub async fn send_notification(&self, job: &NotificationJob) -> Result<()> {
        let Some(mailer) = &self.inner else {
            tracing::debug!(job_id = %job.id, "SMTP not configured, skipping delivery");
            return Ok(());
        };

        let subject = render_subject(job);
        let body = render_body(job);

        for recipient in &mailer.recipients {
            let message = Message::builder()
                .from(mailer.from.clone())
                .to(recipient.clone())
                .subject(&subject)
                .header(ContentType::TEXT_HTML)
                .body(body.clone())
                .map_err(|e| Error::Internal(format!("Failed to build email: {}", e)))?;

            mailer
                .transport
                .send(message)
                .await
                .map_err(|e| Error::Internal(format!("SMTP send failed: {}", e)))?;
        }

        Ok(())
    }
}

fn render_subject(job: &NotificationJob) -> String {
    match job.operation {
        Operation::Created => format!("Recipe added: {}", job.recipe_title),
        Operation::Updated => format!("Recipe updated: {}", job.recipe_title),
        Operation::Deleted => format!("Recipe deleted: {}", job.recipe_title),
    }
}

fn render_body(job: &NotificationJob) -> String {
    let heading = match job.operation {
        Operation::Created => "Recipe Added",
        Operation::Updated => "Recipe Updated",
        Operation::Deleted => "Recipe Deleted",
    };

    let mut body = format!(
        "<h2>{}</h2>\n<p><strong>{}</strong> has been {} by {}.</p>\n",
        heading, job.recipe_title, job.operation, job.actor
    );

    if job.operation != Operation::Deleted {
        if let Some(recipe) = &job.payload {
            body.push_str(&format!(
                "<p><strong>Category:</strong> {}</p>\n\
                 <p><strong>Prep Time:</strong> {} minutes</p>\n\
                 <p><strong>Cook Time:</strong> {} minutes</p>\n\
                 <p><strong>Servings:</strong> {}</p>\n",
                recipe.category, recipe.prep_time_minutes, recipe.cook_time_minutes, recipe.servings
            ));
            if let Some(description) = &recipe.description {
                body.push_str(&format!(
                    "<p><strong>Description:</strong> {}</p>\n",
                    description
                ));
            }
        }
    }

    body
}
