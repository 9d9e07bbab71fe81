//! Notice repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use noticeboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

use crate::entities::{Notice, notice};

/// Repository for notice operations.
#[derive(Clone)]
pub struct NoticeRepository {
    db: Arc<DatabaseConnection>,
}

impl NoticeRepository {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find notice by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notice::Model>> {
        Notice::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find notice by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<notice::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notice not found: {id}")))
    }

    /// Page of published notices, newest `publish_at` first.
    pub async fn find_published(&self, limit: u64, offset: u64) -> AppResult<Vec<notice::Model>> {
        Notice::find()
            .filter(notice::Column::IsPublished.eq(true))
            .order_by(notice::Column::PublishAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published notices.
    pub async fn count_published(&self) -> AppResult<u64> {
        Notice::find()
            .filter(notice::Column::IsPublished.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of all notices (for admin), newest `publish_at` first.
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<notice::Model>> {
        Notice::find()
            .order_by(notice::Column::PublishAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all notices.
    pub async fn count(&self) -> AppResult<u64> {
        Notice::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find unpublished notices whose `publish_at` is at or before `now`.
    pub async fn find_due(&self, now: DateTime<Utc>) -> AppResult<Vec<notice::Model>> {
        Notice::find()
            .filter(notice::Column::IsPublished.eq(false))
            .filter(notice::Column::PublishAt.lte(now))
            .order_by_asc(notice::Column::PublishAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new notice.
    pub async fn create(&self, model: notice::ActiveModel) -> AppResult<notice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a notice.
    pub async fn update(&self, model: notice::ActiveModel) -> AppResult<notice::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip `is_published` to true only if it is currently false.
    ///
    /// Returns the row as stored after the update when this call performed
    /// the transition, `None` otherwise. Concurrent callers racing on the
    /// same notice see exactly one `Some`.
    pub async fn mark_published(&self, id: &str) -> AppResult<Option<notice::Model>> {
        let updated = Notice::update_many()
            .col_expr(notice::Column::IsPublished, Expr::value(true))
            .filter(notice::Column::Id.eq(id))
            .filter(notice::Column::IsPublished.eq(false))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated.into_iter().next())
    }

    /// Delete a notice. Returns `false` if no row matched.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Notice::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
