//! Content item repository for database operations.

use chrono::Utc;
use domain::models::content::{ContentCounter, ContentItem, ContentKind, CreateContentRequest};
use domain::models::stats::{ContentKindStats, ContentStats};
use domain::repositories::{ContentStore, StoreError};
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::{ContentItemEntity, ContentKindDb, ContentKindStatsRow};
use crate::metrics::QueryTimer;

const COLUMNS: &str =
    "id, kind, title, author, description, media_url, views, plays, downloads, created_at, updated_at";

/// Repository for content catalogue operations.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ContentStore for ContentRepository {
    async fn create(&self, request: CreateContentRequest) -> Result<ContentItem, StoreError> {
        let item = ContentItem::from_new(request, Utc::now());
        let sql = format!(
            r#"
            INSERT INTO content_items (id, kind, title, author, description, media_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {COLUMNS}
            "#
        );

        let timer = QueryTimer::new("create_content_item");
        let result = sqlx::query_as::<_, ContentItemEntity>(&sql)
            .bind(item.id)
            .bind(ContentKindDb::from(item.kind))
            .bind(&item.title)
            .bind(&item.author)
            .bind(&item.description)
            .bind(&item.media_url)
            .bind(item.created_at)
            .fetch_one(&self.pool)
            .await;
        timer.record(result.is_ok());
        Ok(result.map_err(store_error)?.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM content_items WHERE id = $1");
        let timer = QueryTimer::new("find_content_item_by_id");
        let result = sqlx::query_as::<_, ContentItemEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn list(
        &self,
        kind: Option<ContentKind>,
        page: PageRequest,
    ) -> Result<Page<ContentItem>, StoreError> {
        let kind = kind.map(ContentKindDb::from);

        let timer = QueryTimer::new("count_content_items");
        let total: Result<i64, sqlx::Error> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_items WHERE ($1::content_kind IS NULL OR kind = $1)",
        )
        .bind(kind)
        .fetch_one(&self.pool)
        .await;
        timer.record(total.is_ok());
        let total = total.map_err(store_error)?;

        let sql = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE ($1::content_kind IS NULL OR kind = $1) \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3"
        );
        let timer = QueryTimer::new("list_content_items");
        let rows = sqlx::query_as::<_, ContentItemEntity>(&sql)
            .bind(kind)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await;
        timer.record(rows.is_ok());

        let items = rows
            .map_err(store_error)?
            .into_iter()
            .map(ContentItem::from)
            .collect();
        Ok(Page::new(items, total.max(0) as u64, page))
    }

    async fn increment(
        &self,
        id: Uuid,
        counter: ContentCounter,
    ) -> Result<Option<ContentItem>, StoreError> {
        let column = counter.column();
        let sql = format!(
            "UPDATE content_items SET {column} = {column} + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let timer = QueryTimer::new(format!("increment_content_{}", column));
        let result = sqlx::query_as::<_, ContentItemEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("delete_content_item");
        let result = sqlx::query("DELETE FROM content_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record(result.is_ok());
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }

    async fn stats(&self) -> Result<ContentStats, StoreError> {
        let timer = QueryTimer::new("content_stats");
        let result = sqlx::query_as::<_, ContentKindStatsRow>(
            r#"
            SELECT
                kind,
                COUNT(*) AS count,
                COALESCE(SUM(views), 0)::BIGINT AS views,
                COALESCE(SUM(plays), 0)::BIGINT AS plays,
                COALESCE(SUM(downloads), 0)::BIGINT AS downloads
            FROM content_items
            GROUP BY kind
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record(result.is_ok());

        let rows = result
            .map_err(store_error)?
            .into_iter()
            .map(ContentKindStats::from)
            .collect();
        Ok(ContentStats::from_kind_rows(rows))
    }
}
