//! Test helpers shared by the service, API and scheduler tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use noticeboard_common::{AppError, AppResult};

use crate::services::email::{EmailMessage, Mailer};

/// Mailer that records every message and can be told to fail for
/// specific recipients.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: HashSet<String>,
}

impl RecordingMailer {
    /// A mailer that accepts everything.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A mailer that rejects messages addressed to any of `recipients`.
    #[must_use]
    pub fn failing_for(recipients: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::default(),
            failing: recipients.iter().map(ToString::to_string).collect(),
        })
    }

    /// Messages accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Recipients of accepted messages, sorted.
    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        let mut to: Vec<String> = self.sent().into_iter().map(|m| m.to).collect();
        to.sort();
        to
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        if self.failing.contains(&message.to) {
            return Err(AppError::Mail(format!("mailbox unavailable: {}", message.to)));
        }
        self.sent
            .lock()
            .map_err(|_| AppError::Internal("mailer lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}
