//! Email notifications for newly found opportunities.

mod render;
#[cfg(feature = "smtp")]
mod smtp;

pub use render::{render_html, render_text};
#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpMailer};

use async_trait::async_trait;
use tracing::info;

use crate::Result;

/// An outgoing email with a plain text body and an HTML alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Email {
    /// Build an email whose HTML part is derived from the plain text.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            to: to.into(),
            subject: subject.into(),
            html: render::text_to_html(&text),
            text,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }
}

/// Delivers emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Mailer name for logging/debugging.
    fn name(&self) -> &str;

    async fn send(&self, email: &Email) -> Result<()>;
}

/// Mailer that only logs. Used when SMTP is not configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, email: &Email) -> Result<()> {
        info!(
            to = %email.to,
            subject = %email.subject,
            bytes = email.text.len(),
            "SMTP not configured, email not sent"
        );
        Ok(())
    }
}
