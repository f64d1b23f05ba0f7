//! Registrant repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::registrant::{NewRegistrant, Registrant, RegistrantKind};
use domain::models::stats::RegistrationStats;
use domain::repositories::{RegistrantPatch, RegistrantQuery, RegistrantStore, StoreError};
use shared::pagination::Page;
use sqlx::PgPool;
use uuid::Uuid;

use super::{like_pattern, store_error};
use crate::entities::{
    DepartmentCountRow, GenderDb, LeaderStatusDb, MaritalStatusDb, RegistrantEntity,
    RegistrantKindDb, RegistrationTotalsRow,
};
use crate::metrics::QueryTimer;

const COLUMNS: &str = "id, kind, first_name, last_name, email, phone, address, gender, \
    marital_status, is_leader, ministry, custom_ministry, departments, registration_code, \
    is_confirmed, check_in_status, check_in_time, created_at, updated_at";

const LIST_FILTER: &str = r#"
    ($1::registrant_kind IS NULL OR kind = $1)
    AND ($2::text IS NULL
         OR first_name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2
         OR phone ILIKE $2 OR registration_code ILIKE $2)
    AND ($3::boolean IS NULL OR is_confirmed = $3)
    AND ($4::boolean IS NULL OR check_in_status = $4)
    AND ($5::text IS NULL OR $5 = ANY(departments))
"#;

/// Repository for registrant-related database operations.
#[derive(Clone)]
pub struct RegistrantRepository {
    pool: PgPool,
}

impl RegistrantRepository {
    /// Creates a new RegistrantRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by<T>(
        &self,
        query_name: &str,
        column: &str,
        value: T,
    ) -> Result<Option<Registrant>, StoreError>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    {
        let sql = format!("SELECT {COLUMNS} FROM registrants WHERE {column} = $1");
        let timer = QueryTimer::new(query_name);
        let result = sqlx::query_as::<_, RegistrantEntity>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await;
        timer.record(result.is_ok());
        result.map_err(store_error)?.map(Registrant::try_from).transpose()
    }
}

#[async_trait::async_trait]
impl RegistrantStore for RegistrantRepository {
    async fn insert(
        &self,
        registrant: NewRegistrant,
        registration_code: &str,
    ) -> Result<Registrant, StoreError> {
        let r = Registrant::from_new(registrant, registration_code.to_string(), Utc::now());
        let departments: Vec<String> = r.departments.iter().map(|d| d.as_str().to_string()).collect();

        let sql = format!(
            r#"
            INSERT INTO registrants (
                id, kind, first_name, last_name, email, phone, address, gender,
                marital_status, is_leader, ministry, custom_ministry, departments,
                registration_code, is_confirmed, check_in_status, check_in_time,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)
            RETURNING {COLUMNS}
            "#
        );

        let timer = QueryTimer::new("insert_registrant");
        let result = sqlx::query_as::<_, RegistrantEntity>(&sql)
            .bind(r.id)
            .bind(RegistrantKindDb::from(r.kind))
            .bind(&r.first_name)
            .bind(&r.last_name)
            .bind(&r.email)
            .bind(&r.phone)
            .bind(&r.address)
            .bind(GenderDb::from(r.gender))
            .bind(MaritalStatusDb::from(r.marital_status))
            .bind(LeaderStatusDb::from(r.is_leader))
            .bind(&r.ministry)
            .bind(&r.custom_ministry)
            .bind(&departments)
            .bind(&r.registration_code)
            .bind(r.is_confirmed)
            .bind(r.check_in_status)
            .bind(r.check_in_time)
            .bind(r.created_at)
            .fetch_one(&self.pool)
            .await;
        timer.record(result.is_ok());

        Registrant::try_from(result.map_err(store_error)?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Registrant>, StoreError> {
        self.fetch_one_by("find_registrant_by_id", "id", id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Registrant>, StoreError> {
        self.fetch_one_by("find_registrant_by_code", "registration_code", code.to_string())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        self.fetch_one_by("find_registrant_by_email", "email", email.trim().to_lowercase())
            .await
    }

    async fn list(&self, query: &RegistrantQuery) -> Result<Page<Registrant>, StoreError> {
        let kind = query.kind.map(RegistrantKindDb::from);
        let search = query.search_term().map(|t| like_pattern(&t));
        let department = query.department.map(|d| d.as_str().to_string());

        let count_sql = format!("SELECT COUNT(*) FROM registrants WHERE {LIST_FILTER}");
        let timer = QueryTimer::new("count_registrants");
        let total: Result<i64, sqlx::Error> = sqlx::query_scalar(&count_sql)
            .bind(kind)
            .bind(&search)
            .bind(query.confirmed)
            .bind(query.checked_in)
            .bind(&department)
            .fetch_one(&self.pool)
            .await;
        timer.record(total.is_ok());
        let total = total.map_err(store_error)?;

        let list_sql = format!(
            "SELECT {COLUMNS} FROM registrants WHERE {LIST_FILTER} \
             ORDER BY created_at DESC, id LIMIT $6 OFFSET $7"
        );
        let timer = QueryTimer::new("list_registrants");
        let rows = sqlx::query_as::<_, RegistrantEntity>(&list_sql)
            .bind(kind)
            .bind(&search)
            .bind(query.confirmed)
            .bind(query.checked_in)
            .bind(&department)
            .bind(query.page.limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(&self.pool)
            .await;
        timer.record(rows.is_ok());

        let items = rows
            .map_err(store_error)?
            .into_iter()
            .map(Registrant::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total.max(0) as u64, query.page))
    }

    async fn check_in(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Registrant>, StoreError> {
        let sql = format!(
            r#"
            UPDATE registrants
            SET check_in_status = TRUE, check_in_time = $2, updated_at = $2
            WHERE id = $1 AND check_in_status = FALSE
            RETURNING {COLUMNS}
            "#
        );
        let timer = QueryTimer::new("check_in_registrant");
        let result = sqlx::query_as::<_, RegistrantEntity>(&sql)
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await;
        timer.record(result.is_ok());
        result.map_err(store_error)?.map(Registrant::try_from).transpose()
    }

    async fn confirm(&self, id: Uuid) -> Result<Option<Registrant>, StoreError> {
        let sql = format!(
            r#"
            UPDATE registrants
            SET is_confirmed = TRUE,
                updated_at = CASE WHEN is_confirmed THEN updated_at ELSE NOW() END
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let timer = QueryTimer::new("confirm_registrant");
        let result = sqlx::query_as::<_, RegistrantEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record(result.is_ok());
        result.map_err(store_error)?.map(Registrant::try_from).transpose()
    }

    async fn update_many(
        &self,
        kind: Option<RegistrantKind>,
        ids: &[Uuid],
        patch: RegistrantPatch,
    ) -> Result<u64, StoreError> {
        let kind = kind.map(RegistrantKindDb::from);
        let timer = QueryTimer::new("bulk_update_registrants");
        let result = match patch {
            RegistrantPatch::Confirm => {
                sqlx::query(
                    r#"
                    UPDATE registrants
                    SET is_confirmed = TRUE, updated_at = NOW()
                    WHERE id = ANY($1)
                      AND ($2::registrant_kind IS NULL OR kind = $2)
                      AND is_confirmed = FALSE
                    "#,
                )
                .bind(ids)
                .bind(kind)
                .execute(&self.pool)
                .await
            }
            RegistrantPatch::CheckIn { at } => {
                sqlx::query(
                    r#"
                    UPDATE registrants
                    SET check_in_status = TRUE, check_in_time = $3, updated_at = $3
                    WHERE id = ANY($1)
                      AND ($2::registrant_kind IS NULL OR kind = $2)
                      AND check_in_status = FALSE
                    "#,
                )
                .bind(ids)
                .bind(kind)
                .bind(at)
                .execute(&self.pool)
                .await
            }
        };
        timer.record(result.is_ok());
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn delete_many(
        &self,
        kind: Option<RegistrantKind>,
        ids: &[Uuid],
    ) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("bulk_delete_registrants");
        let result = sqlx::query(
            r#"
            DELETE FROM registrants
            WHERE id = ANY($1) AND ($2::registrant_kind IS NULL OR kind = $2)
            "#,
        )
        .bind(ids)
        .bind(kind.map(RegistrantKindDb::from))
        .execute(&self.pool)
        .await;
        timer.record(result.is_ok());
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn stats(&self) -> Result<RegistrationStats, StoreError> {
        let totals = async {
            let timer = QueryTimer::new("registration_totals");
            let result = sqlx::query_as::<_, RegistrationTotalsRow>(
                r#"
                SELECT
                    COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE kind = 'participant') AS participants,
                    COUNT(*) FILTER (WHERE kind = 'volunteer') AS volunteers,
                    COUNT(*) FILTER (WHERE is_confirmed) AS confirmed,
                    COUNT(*) FILTER (WHERE check_in_status) AS checked_in,
                    COUNT(*) FILTER (WHERE is_leader = 'yes') AS leaders
                FROM registrants
                "#,
            )
            .fetch_one(&self.pool)
            .await;
            timer.record(result.is_ok());
            result
        };

        let departments = async {
            let timer = QueryTimer::new("volunteer_department_counts");
            let result = sqlx::query_as::<_, DepartmentCountRow>(
                r#"
                SELECT d AS department, COUNT(*) AS count
                FROM registrants, unnest(departments) AS d
                WHERE kind = 'volunteer'
                GROUP BY d
                "#,
            )
            .fetch_all(&self.pool)
            .await;
            timer.record(result.is_ok());
            result
        };

        let (totals, departments) =
            tokio::try_join!(totals, departments).map_err(store_error)?;
        Ok(totals.into_stats(&departments))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(store_error)
    }
}
