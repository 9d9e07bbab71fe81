//! Account repository.

use std::sync::Arc;

use crate::entities::{Account, account, account::Role};
use noticeboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Account repository for database operations.
#[derive(Clone)]
pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an account by email address.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<account::Model>> {
        Account::find()
            .filter(account::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All accounts holding `role`, oldest first.
    pub async fn find_by_role(&self, role: Role) -> AppResult<Vec<account::Model>> {
        Account::find()
            .filter(account::Column::Role.eq(role))
            .order_by_asc(account::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new account.
    pub async fn create(&self, model: account::ActiveModel) -> AppResult<account::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            let message = e.to_string();
            if message.contains("duplicate key") {
                AppError::Conflict("Email already registered".to_string())
            } else {
                AppError::Database(message)
            }
        })
    }
}
