//! Notice entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An announcement with a scheduled or immediate visibility time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notice")]
pub struct Model {
    /// Unique notice ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Headline shown in lists and email subjects.
    pub title: String,

    /// Body of the notice.
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Free-form category label (exams, events, ...).
    pub category: String,

    /// Link to an external attachment.
    #[sea_orm(nullable)]
    pub attachment_url: Option<String>,

    /// When the notice becomes eligible for publication.
    #[sea_orm(indexed)]
    pub publish_at: DateTime<Utc>,

    /// Visible to students once true. Only ever flips false -> true.
    pub is_published: bool,

    /// Authoring account.
    #[sea_orm(indexed)]
    pub created_by: String,

    /// When the notice was created.
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Whether the notice should be published at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_published && self.publish_at <= now
    }
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::CreatedBy",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn notice(publish_at: DateTime<Utc>, is_published: bool) -> Model {
        Model {
            id: "n1".to_string(),
            title: "Exam timetable".to_string(),
            description: "Semester exams start Monday".to_string(),
            category: "exams".to_string(),
            attachment_url: None,
            publish_at,
            is_published,
            created_by: "admin1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        assert!(notice(now - Duration::minutes(1), false).is_due(now));
        assert!(notice(now, false).is_due(now));
        assert!(!notice(now + Duration::hours(1), false).is_due(now));
        assert!(!notice(now - Duration::minutes(1), true).is_due(now));
    }
}
