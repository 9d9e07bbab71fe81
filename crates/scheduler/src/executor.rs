//! [`JobExecutor`] backed by the notice publisher.

use async_trait::async_trait;
use noticeboard_core::NoticePublisher;

use crate::scheduler::{JobError, JobExecutor};

#[async_trait]
impl JobExecutor for NoticePublisher {
    async fn publish_due_notices(&self) -> Result<u64, JobError> {
        let report = self.sweep().await?;
        Ok(u64::try_from(report.published).unwrap_or(u64::MAX))
    }
}
