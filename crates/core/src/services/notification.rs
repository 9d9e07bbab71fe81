//! Notification fan-out.
//!
//! Emails every student when a notice is published. Sends run
//! concurrently; a failed send is logged and counted but never affects
//! the other recipients or the publication itself.

use futures::future::join_all;
use noticeboard_db::{
    entities::{account::Role, notice},
    repositories::AccountRepository,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::services::email::{MailerService, notice_email};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanoutReport {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Sends the "new notice" email to every student.
#[derive(Clone)]
pub struct NotificationFanout {
    account_repo: AccountRepository,
    mailer: MailerService,
    link_base_url: String,
}

impl NotificationFanout {
    /// Create a new fan-out.
    #[must_use]
    pub fn new(account_repo: AccountRepository, mailer: MailerService, link_base_url: String) -> Self {
        Self {
            account_repo,
            mailer,
            link_base_url,
        }
    }

    /// Notify all students about a freshly published notice.
    ///
    /// Not idempotent: call it once per `false -> true` transition.
    pub async fn notify_published(&self, notice: &notice::Model) -> FanoutReport {
        let students = match self.account_repo.find_by_role(Role::Student).await {
            Ok(students) => students,
            Err(e) => {
                error!(notice_id = %notice.id, error = %e, "Failed to load notification recipients");
                return FanoutReport::default();
            }
        };

        let mailer = &self.mailer;
        let sends = students.iter().map(|student| {
            let message = notice_email(&student.email, notice, &self.link_base_url);
            async move { (student, mailer.send(message).await) }
        });

        let mut report = FanoutReport {
            recipients: students.len(),
            ..FanoutReport::default()
        };

        for (student, result) in join_all(sends).await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        notice_id = %notice.id,
                        account_id = %student.id,
                        error = %e,
                        "Failed to deliver notice email"
                    );
                }
            }
        }

        info!(
            notice_id = %notice.id,
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "Notice notification fan-out finished"
        );

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingMailer;
    use chrono::Utc;
    use noticeboard_db::test_utils::{account_fixture, notice_fixture};
    use noticeboard_db::entities::account;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use std::sync::Arc;

    fn students() -> Vec<account::Model> {
        vec![
            account_fixture("s1", "s1@college.edu", Role::Student),
            account_fixture("s2", "s2@college.edu", Role::Student),
            account_fixture("s3", "s3@college.edu", Role::Student),
        ]
    }

    fn fanout_with(db: MockDatabase, mailer: MailerService) -> NotificationFanout {
        let repo = AccountRepository::new(Arc::new(db.into_connection()));
        NotificationFanout::new(repo, mailer, "http://localhost:5173".to_string())
    }

    #[tokio::test]
    async fn test_one_email_per_student() {
        let mailer = RecordingMailer::new();
        let fanout = fanout_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([students()]),
            mailer.clone(),
        );

        let report = fanout
            .notify_published(&notice_fixture("n1", Utc::now(), true))
            .await;

        assert_eq!(
            report,
            FanoutReport {
                recipients: 3,
                delivered: 3,
                failed: 0
            }
        );
        assert_eq!(
            mailer.recipients(),
            vec!["s1@college.edu", "s2@college.edu", "s3@college.edu"]
        );
        assert!(
            mailer
                .sent()
                .iter()
                .all(|m| m.subject == "New Notice: Notice n1")
        );
    }

    #[tokio::test]
    async fn test_failing_recipient_does_not_block_others() {
        let mailer = RecordingMailer::failing_for(&["s2@college.edu"]);
        let fanout = fanout_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([students()]),
            mailer.clone(),
        );

        let report = fanout
            .notify_published(&notice_fixture("n1", Utc::now(), true))
            .await;

        assert_eq!(report.recipients, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(mailer.recipients(), vec!["s1@college.edu", "s3@college.edu"]);
    }

    #[tokio::test]
    async fn test_no_students_sends_nothing() {
        let mailer = RecordingMailer::new();
        let fanout = fanout_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<account::Model>::new()]),
            mailer.clone(),
        );

        let report = fanout
            .notify_published(&notice_fixture("n1", Utc::now(), true))
            .await;

        assert_eq!(report, FanoutReport::default());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_recipient_lookup_failure_yields_empty_report() {
        let mailer = RecordingMailer::new();
        let fanout = fanout_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())]),
            mailer.clone(),
        );

        let report = fanout
            .notify_published(&notice_fixture("n1", Utc::now(), true))
            .await;

        assert_eq!(report, FanoutReport::default());
        assert!(mailer.sent().is_empty());
    }
}
