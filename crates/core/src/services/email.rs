//! Outbound email.
//!
//! The [`Mailer`] trait lets the notification fan-out send mail without
//! depending on a transport. [`SmtpMailer`] talks to a real relay through
//! lettre; [`NoOpMailer`] only logs, for deployments with mail disabled.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use noticeboard_common::{AppError, AppResult, config::MailConfig};
use noticeboard_db::entities::notice;

/// A single outbound message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// Trait for sending email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message.
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// Shared mailer handle.
pub type MailerService = Arc<dyn Mailer>;

/// Mailer that sends through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a mailer from configuration.
    pub fn from_config(config: &MailConfig) -> AppResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP relay: {e}")))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let address = config
            .from_address
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid sender address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid recipient {}: {e}", message.to)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(message.text, message.html))
            .map_err(|e| AppError::Mail(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        Ok(())
    }
}

/// Mailer that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMailer;

#[async_trait]
impl Mailer for NoOpMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        tracing::debug!(to = %message.to, subject = %message.subject, "Mail disabled, dropping message");
        Ok(())
    }
}

/// Render the "new notice" email for one recipient.
///
/// `link_base` is the front-end origin; the notice is linked at
/// `<link_base>/notice/<id>`.
#[must_use]
pub fn notice_email(to: &str, notice: &notice::Model, link_base: &str) -> EmailMessage {
    let link = format!("{}/notice/{}", link_base.trim_end_matches('/'), notice.id);
    let published = notice.publish_at.format("%Y-%m-%d %H:%M UTC");

    let html = format!(
        r#"<h2>{title}</h2>
<p><strong>Category:</strong> {category}</p>
<p><strong>Published:</strong> {published}</p>
<p>{description}</p>
<p><a href="{link}">View notice</a></p>"#,
        title = escape_html(&notice.title),
        category = escape_html(&notice.category),
        description = escape_html(&notice.description),
        link = escape_html(&link),
    );

    let text = format!(
        "{}\n\nCategory: {}\nPublished: {}\n\n{}\n\nView notice: {}\n",
        notice.title, notice.category, published, notice.description, link
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("New Notice: {}", notice.title),
        html,
        text,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use noticeboard_db::test_utils::notice_fixture;

    #[test]
    fn test_notice_email_contents() {
        let publish_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let n = notice_fixture("n1", publish_at, true);

        let msg = notice_email("student@college.edu", &n, "https://board.college.edu/");

        assert_eq!(msg.to, "student@college.edu");
        assert_eq!(msg.subject, "New Notice: Notice n1");
        assert!(msg.html.contains("https://board.college.edu/notice/n1"));
        assert!(msg.html.contains("general"));
        assert!(msg.html.contains("2025-03-01 09:30 UTC"));
        assert!(msg.text.contains("Classes are suspended tomorrow."));
    }

    #[test]
    fn test_notice_email_escapes_html() {
        let mut n = notice_fixture("n1", Utc::now(), true);
        n.title = "<b>Exams</b> & results".to_string();

        let msg = notice_email("s@college.edu", &n, "http://localhost:5173");

        assert!(msg.html.contains("&lt;b&gt;Exams&lt;/b&gt; &amp; results"));
        assert!(!msg.html.contains("<b>Exams"));
        // Subject and plain text are not HTML.
        assert_eq!(msg.subject, "New Notice: <b>Exams</b> & results");
    }

    #[tokio::test]
    async fn test_noop_mailer_accepts_everything() {
        let mailer = NoOpMailer;
        let msg = notice_email("s@college.edu", &notice_fixture("n1", Utc::now(), true), "");
        assert!(mailer.send(msg).await.is_ok());
    }
}
