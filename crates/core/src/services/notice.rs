//! Notice service.
//!
//! CRUD over notices. Manual publishing (create or update with
//! `is_published: true`) goes through [`NoticePublisher::publish`], the
//! same conditional transition the scheduled sweep uses.

use chrono::{DateTime, Utc};
use noticeboard_common::{AppError, AppResult, IdGenerator};
use noticeboard_db::{entities::notice, repositories::NoticeRepository};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

use crate::services::publisher::NoticePublisher;

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
    offset: u64,
}

impl Pagination {
    /// Build from raw query values. Missing values take the defaults,
    /// `limit` is capped, and non-positive values are rejected, as is a
    /// page whose row offset does not fit a SQL `BIGINT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> AppResult<Self> {
        let page = page.map_or(Ok(1), |p| positive(p, "page"))?;
        let limit = limit
            .map_or(Ok(DEFAULT_PAGE_LIMIT), |l| positive(l, "limit"))?
            .min(MAX_PAGE_LIMIT);

        let offset = (page - 1)
            .checked_mul(limit)
            .filter(|o| i64::try_from(*o).is_ok())
            .ok_or_else(|| AppError::BadRequest("page is out of range".to_string()))?;

        Ok(Self {
            page,
            limit,
            offset,
        })
    }

    #[must_use]
    pub const fn page(self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn limit(self) -> u64 {
        self.limit
    }

    /// Rows skipped before this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

fn positive(value: i64, name: &str) -> AppResult<u64> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| AppError::BadRequest(format!("{name} must be a positive integer")))
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub total_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    fn new(data: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self {
            data,
            page: pagination.page,
            total_pages: total.div_ceil(pagination.limit),
            total,
        }
    }

    /// Convert every item.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total: self.total,
        }
    }
}

/// Input for creating a notice.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(length(min = 1, max = 64))]
    pub category: String,

    #[validate(length(max = 1024))]
    pub attachment_url: Option<String>,

    /// Defaults to now.
    pub publish_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_published: bool,
}

/// Input for updating a notice. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoticeInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,

    #[validate(length(max = 1024))]
    pub attachment_url: Option<String>,

    pub publish_at: Option<DateTime<Utc>>,

    pub is_published: Option<bool>,
}

/// Notice service for business logic.
#[derive(Clone)]
pub struct NoticeService {
    notice_repo: NoticeRepository,
    publisher: NoticePublisher,
    id_gen: IdGenerator,
}

impl NoticeService {
    /// Create a new notice service.
    #[must_use]
    pub const fn new(notice_repo: NoticeRepository, publisher: NoticePublisher) -> Self {
        Self {
            notice_repo,
            publisher,
            id_gen: IdGenerator::new(),
        }
    }

    /// Published notices, newest first.
    pub async fn list_published(&self, pagination: Pagination) -> AppResult<Page<notice::Model>> {
        let total = self.notice_repo.count_published().await?;
        let data = self
            .notice_repo
            .find_published(pagination.limit, pagination.offset())
            .await?;

        Ok(Page::new(data, pagination, total))
    }

    /// All notices including scheduled ones, newest first.
    pub async fn list_all(&self, pagination: Pagination) -> AppResult<Page<notice::Model>> {
        let total = self.notice_repo.count().await?;
        let data = self
            .notice_repo
            .find_all(pagination.limit, pagination.offset())
            .await?;

        Ok(Page::new(data, pagination, total))
    }

    /// Get one notice. Unpublished notices are only visible when
    /// `include_unpublished` is set.
    pub async fn get(&self, id: &str, include_unpublished: bool) -> AppResult<notice::Model> {
        let notice = self.notice_repo.get_by_id(id).await?;

        if !notice.is_published && !include_unpublished {
            return Err(AppError::NotFound(format!("Notice not found: {id}")));
        }

        Ok(notice)
    }

    /// Create a notice.
    ///
    /// The row is always inserted unpublished; `is_published: true` then
    /// publishes it through the conditional transition.
    pub async fn create(&self, author_id: &str, input: CreateNoticeInput) -> AppResult<notice::Model> {
        input.validate()?;

        let now = Utc::now();
        let model = notice::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            category: Set(input.category),
            attachment_url: Set(input.attachment_url),
            publish_at: Set(input.publish_at.unwrap_or(now)),
            is_published: Set(false),
            created_by: Set(author_id.to_string()),
            created_at: Set(now),
        };

        let notice = self.notice_repo.create(model).await?;

        info!(notice_id = %notice.id, author_id = %author_id, "Notice created");

        if input.is_published {
            return Ok(self.publish_saved(notice).await);
        }

        Ok(notice)
    }

    /// Update a notice.
    ///
    /// Publication is one-way: asking to unpublish a published notice is a
    /// `BadRequest`, and `is_published: true` triggers notifications only
    /// if this call performs the transition.
    pub async fn update(&self, id: &str, input: UpdateNoticeInput) -> AppResult<notice::Model> {
        input.validate()?;

        let current = self.notice_repo.get_by_id(id).await?;

        if input.is_published == Some(false) && current.is_published {
            return Err(AppError::BadRequest(
                "A published notice cannot be unpublished".to_string(),
            ));
        }

        let mut active = current.clone().into_active_model();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(attachment_url) = input.attachment_url {
            active.attachment_url = Set(Some(attachment_url));
        }
        if let Some(publish_at) = input.publish_at {
            active.publish_at = Set(publish_at);
        }

        let notice = if active.is_changed() {
            self.notice_repo.update(active).await?
        } else {
            current
        };

        info!(notice_id = %notice.id, "Notice updated");

        if input.is_published == Some(true) && !notice.is_published {
            return Ok(self.publish_saved(notice).await);
        }

        Ok(notice)
    }

    /// Publish a notice whose other fields are already saved.
    ///
    /// The saved row stands even if publishing fails: the error is logged
    /// and the notice is returned unpublished, left for the next sweep
    /// once its `publish_at` has passed.
    async fn publish_saved(&self, mut notice: notice::Model) -> notice::Model {
        match self.publisher.publish(&notice.id).await {
            Ok(Some(publication)) => publication.notice,
            Ok(None) => {
                // Published concurrently by the sweep or another request.
                notice.is_published = true;
                notice
            }
            Err(e) => {
                error!(notice_id = %notice.id, error = %e, "Saved notice but failed to publish it");
                notice
            }
        }
    }

    /// Delete a notice.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.notice_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Notice not found: {id}")));
        }

        info!(notice_id = %id, "Notice deleted");
        Ok(())
    }
}
