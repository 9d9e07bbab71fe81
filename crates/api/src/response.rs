//! API response types.

use chrono::{DateTime, Utc};
use noticeboard_db::entities::notice;
use serde::Serialize;

/// Notice as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub attachment_url: Option<String>,
    pub publish_at: DateTime<Utc>,
    pub is_published: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<notice::Model> for NoticeResponse {
    fn from(notice: notice::Model) -> Self {
        Self {
            id: notice.id,
            title: notice.title,
            description: notice.description,
            category: notice.category,
            attachment_url: notice.attachment_url,
            publish_at: notice.publish_at,
            is_published: notice.is_published,
            created_by: notice.created_by,
            created_at: notice.created_at,
        }
    }
}

/// Plain message body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
