//! Content item entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::content::{ContentItem, ContentKind};
use domain::models::stats::ContentKindStats;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for `content_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "content_kind", rename_all = "snake_case")]
pub enum ContentKindDb {
    Sermon,
    Media,
    AudioMessage,
    Testimony,
}

impl From<ContentKindDb> for ContentKind {
    fn from(db: ContentKindDb) -> Self {
        match db {
            ContentKindDb::Sermon => ContentKind::Sermon,
            ContentKindDb::Media => ContentKind::Media,
            ContentKindDb::AudioMessage => ContentKind::AudioMessage,
            ContentKindDb::Testimony => ContentKind::Testimony,
        }
    }
}

impl From<ContentKind> for ContentKindDb {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Sermon => ContentKindDb::Sermon,
            ContentKind::Media => ContentKindDb::Media,
            ContentKind::AudioMessage => ContentKindDb::AudioMessage,
            ContentKind::Testimony => ContentKindDb::Testimony,
        }
    }
}

/// Database row mapping for the content_items table.
#[derive(Debug, Clone, FromRow)]
pub struct ContentItemEntity {
    pub id: Uuid,
    pub kind: ContentKindDb,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub views: i64,
    pub plays: i64,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentItemEntity> for ContentItem {
    fn from(entity: ContentItemEntity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.into(),
            title: entity.title,
            author: entity.author,
            description: entity.description,
            media_url: entity.media_url,
            views: entity.views,
            plays: entity.plays,
            downloads: entity.downloads,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Per-kind aggregate row.
#[derive(Debug, Clone, FromRow)]
pub struct ContentKindStatsRow {
    pub kind: ContentKindDb,
    pub count: i64,
    pub views: i64,
    pub plays: i64,
    pub downloads: i64,
}

impl From<ContentKindStatsRow> for ContentKindStats {
    fn from(row: ContentKindStatsRow) -> Self {
        Self {
            kind: row.kind.into(),
            count: row.count,
            views: row.views,
            plays: row.plays,
            downloads: row.downloads,
        }
    }
}
