//! Publication sweep.
//!
//! Finds notices whose `publish_at` has passed, flips them to published
//! with a conditional update and fans out notifications for each notice
//! this process actually transitioned.

use chrono::{DateTime, Utc};
use noticeboard_common::AppResult;
use noticeboard_db::{entities::notice, repositories::NoticeRepository};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::services::notification::{FanoutReport, NotificationFanout};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Notices found due.
    pub due: usize,
    /// Notices this sweep transitioned to published.
    pub published: usize,
    /// Notices already published by someone else in the meantime.
    pub skipped: usize,
    /// Notices whose publish update failed.
    pub failed: usize,
    pub notifications_delivered: usize,
    pub notifications_failed: usize,
}

/// A transition performed by [`NoticePublisher::publish`].
#[derive(Debug, Clone)]
pub struct Publication {
    /// The notice as stored after the transition.
    pub notice: notice::Model,
    pub fanout: FanoutReport,
}

impl SweepReport {
    fn record_fanout(&mut self, fanout: FanoutReport) {
        self.notifications_delivered += fanout.delivered;
        self.notifications_failed += fanout.failed;
    }
}

/// Publishes due notices and triggers their notifications.
#[derive(Clone)]
pub struct NoticePublisher {
    notice_repo: NoticeRepository,
    fanout: NotificationFanout,
}

impl NoticePublisher {
    /// Create a new publisher.
    #[must_use]
    pub const fn new(notice_repo: NoticeRepository, fanout: NotificationFanout) -> Self {
        Self {
            notice_repo,
            fanout,
        }
    }

    /// Run one sweep against the current time.
    pub async fn sweep(&self) -> AppResult<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep treating `now` as the current time.
    ///
    /// Only the initial query can fail the sweep. Per-notice failures are
    /// logged and counted.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let due = self.notice_repo.find_due(now).await?;

        let mut report = SweepReport {
            due: due.len(),
            ..SweepReport::default()
        };

        if due.is_empty() {
            debug!("No notices due for publication");
            return Ok(report);
        }

        for notice in due {
            match self.publish(&notice.id).await {
                Ok(Some(publication)) => {
                    report.published += 1;
                    report.record_fanout(publication.fanout);
                }
                Ok(None) => {
                    report.skipped += 1;
                    debug!(notice_id = %notice.id, "Notice already published elsewhere");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(notice_id = %notice.id, error = %e, "Failed to publish notice");
                }
            }
        }

        info!(
            due = report.due,
            published = report.published,
            skipped = report.skipped,
            failed = report.failed,
            "Publication sweep finished"
        );

        Ok(report)
    }

    /// Publish one notice if it is still unpublished.
    ///
    /// Returns the stored notice and the fan-out report when this call
    /// performed the transition, `None` when the notice was already
    /// published. This is the only path that sends notice notifications.
    /// Students are mailed the row written by the transition, so edits
    /// made after the notice was found due are included.
    pub async fn publish(&self, id: &str) -> AppResult<Option<Publication>> {
        let Some(notice) = self.notice_repo.mark_published(id).await? else {
            return Ok(None);
        };

        info!(notice_id = %notice.id, title = %notice.title, "Published notice");

        let fanout = self.fanout.notify_published(&notice).await;
        Ok(Some(Publication { notice, fanout }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingMailer;
    use chrono::Duration;
    use noticeboard_db::entities::account::{self, Role};
    use noticeboard_db::repositories::AccountRepository;
    use noticeboard_db::test_utils::{account_fixture, notice_fixture};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use std::sync::Arc;

    /// Row returned by the conditional publish update.
    fn published(notice: &notice::Model) -> Vec<notice::Model> {
        vec![notice::Model {
            is_published: true,
            ..notice.clone()
        }]
    }

    fn lost_race() -> Vec<notice::Model> {
        Vec::new()
    }

    fn students() -> Vec<account::Model> {
        vec![
            account_fixture("s1", "s1@college.edu", Role::Student),
            account_fixture("s2", "s2@college.edu", Role::Student),
        ]
    }

    fn publisher(db: MockDatabase, mailer: Arc<RecordingMailer>) -> NoticePublisher {
        let conn = Arc::new(db.into_connection());
        let fanout = NotificationFanout::new(
            AccountRepository::new(Arc::clone(&conn)),
            mailer,
            "http://localhost:5173".to_string(),
        );
        NoticePublisher::new(NoticeRepository::new(conn), fanout)
    }

    #[tokio::test]
    async fn test_due_notice_is_published_and_mailed() {
        let now = Utc::now();
        let due = notice_fixture("n1", now - Duration::minutes(1), false);
        let mailer = RecordingMailer::new();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due.clone()], published(&due)])
            .append_query_results([students()]);

        let report = publisher(db, mailer.clone()).sweep_at(now).await.unwrap();

        assert_eq!(report.due, 1);
        assert_eq!(report.published, 1);
        assert_eq!(report.notifications_delivered, 2);
        assert_eq!(mailer.recipients(), vec!["s1@college.edu", "s2@college.edu"]);
    }

    #[tokio::test]
    async fn test_nothing_due_changes_nothing() {
        let mailer = RecordingMailer::new();
        // A notice due in an hour is filtered out by the due query.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<notice::Model>::new()]);

        let report = publisher(db, mailer.clone()).sweep().await.unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_second_sweep_sends_no_mail() {
        let now = Utc::now();
        let due = notice_fixture("n1", now - Duration::minutes(1), false);
        let mailer = RecordingMailer::new();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due.clone()], published(&due)])
            .append_query_results([students()])
            .append_query_results([Vec::<notice::Model>::new()]);

        let publisher = publisher(db, mailer.clone());
        publisher.sweep_at(now).await.unwrap();
        let second = publisher.sweep_at(now).await.unwrap();

        assert_eq!(second.published, 0);
        assert_eq!(mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_lost_race_sends_no_mail() {
        let now = Utc::now();
        let due = notice_fixture("n1", now - Duration::minutes(1), false);
        let mailer = RecordingMailer::new();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due], lost_race()]);

        let report = publisher(db, mailer.clone()).sweep_at(now).await.unwrap();

        assert_eq!(report.published, 0);
        assert_eq!(report.skipped, 1);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_does_not_stop_batch() {
        let now = Utc::now();
        let first = notice_fixture("n1", now - Duration::minutes(2), false);
        let second = notice_fixture("n2", now - Duration::minutes(1), false);
        let mailer = RecordingMailer::new();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![first, second.clone()]])
            .append_query_errors([DbErr::Custom("deadlock detected".to_string())])
            .append_query_results([published(&second)])
            .append_query_results([students()]);

        let report = publisher(db, mailer.clone()).sweep_at(now).await.unwrap();

        assert_eq!(report.due, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.published, 1);
        assert!(mailer.sent().iter().all(|m| m.subject == "New Notice: Notice n2"));
    }

    #[tokio::test]
    async fn test_mail_uses_row_stored_by_transition() {
        let now = Utc::now();
        let due = notice_fixture("n1", now - Duration::minutes(1), false);
        // Title edited by an admin after the due query ran.
        let mut stored = published(&due);
        stored[0].title = "Exam rescheduled".to_string();
        let mailer = RecordingMailer::new();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due], stored])
            .append_query_results([students()]);

        publisher(db, mailer.clone()).sweep_at(now).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.subject == "New Notice: Exam rescheduled"));
    }

    #[tokio::test]
    async fn test_publish_returns_stored_notice() {
        let notice = notice_fixture("n1", Utc::now(), false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([published(&notice)])
            .append_query_results([students()]);

        let publication = publisher(db, RecordingMailer::new())
            .publish("n1")
            .await
            .unwrap()
            .unwrap();

        assert!(publication.notice.is_published);
        assert_eq!(publication.fanout.recipients, 2);
    }

    #[tokio::test]
    async fn test_due_query_failure_fails_sweep() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".to_string())]);

        let result = publisher(db, RecordingMailer::new()).sweep().await;

        assert!(result.is_err());
    }
}
