//! In-memory store backend.
//!
//! Used when `storage.backend = "memory"` and by the HTTP integration tests.
//! All data is lost when the process exits. Uniqueness of email and
//! registration code is checked and the row inserted under one write lock,
//! so concurrent registrations behave like the PostgreSQL unique indexes.

use chrono::{DateTime, Utc};
use domain::models::content::{ContentCounter, ContentItem, ContentKind, CreateContentRequest};
use domain::models::registrant::{NewRegistrant, Registrant, RegistrantKind};
use domain::models::stats::{ContentStats, RegistrationStats};
use domain::repositories::{
    ContentStore, RegistrantPatch, RegistrantQuery, RegistrantStore, StoreError,
};
use shared::pagination::{Page, PageRequest};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Rows are kept in insertion order, which is also creation order.
#[derive(Default)]
pub struct InMemoryRegistrantStore {
    rows: RwLock<Vec<Registrant>>,
}

impl InMemoryRegistrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored registrants.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn in_scope(r: &Registrant, kind: Option<RegistrantKind>, ids: &[Uuid]) -> bool {
    kind.map_or(true, |k| k == r.kind) && ids.contains(&r.id)
}

fn paginate<T: Clone>(matching: Vec<&T>, page: PageRequest) -> Page<T> {
    let total = matching.len() as u64;
    let items = matching
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(items, total, page)
}

#[async_trait::async_trait]
impl RegistrantStore for InMemoryRegistrantStore {
    async fn insert(
        &self,
        registrant: NewRegistrant,
        registration_code: &str,
    ) -> Result<Registrant, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.email == registrant.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if rows.iter().any(|r| r.registration_code == registration_code) {
            return Err(StoreError::DuplicateCode);
        }
        let stored = Registrant::from_new(registrant, registration_code.to_string(), Utc::now());
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Registrant>, StoreError> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Registrant>, StoreError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.registration_code == code)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn list(&self, query: &RegistrantQuery) -> Result<Page<Registrant>, StoreError> {
        let rows = self.rows.read().await;
        let matching: Vec<&Registrant> = rows.iter().rev().filter(|r| query.matches(r)).collect();
        Ok(paginate(matching, query.page))
    }

    async fn check_in(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Registrant>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.iter_mut().find(|r| r.id == id && !r.check_in_status) else {
            return Ok(None);
        };
        let updated = row.clone().check_in(at).into_registrant();
        *row = updated.clone();
        Ok(Some(updated))
    }

    async fn confirm(&self, id: Uuid) -> Result<Option<Registrant>, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|r| r.id == id).map(|row| {
            row.confirm(Utc::now());
            row.clone()
        }))
    }

    async fn update_many(
        &self,
        kind: Option<RegistrantKind>,
        ids: &[Uuid],
        patch: RegistrantPatch,
    ) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for row in rows.iter_mut().filter(|r| in_scope(r, kind, ids)) {
            let applied = match patch {
                RegistrantPatch::Confirm => row.confirm(Utc::now()),
                RegistrantPatch::CheckIn { at } => {
                    let outcome = row.clone().check_in(at);
                    let applied = !outcome.was_already_checked_in();
                    *row = outcome.into_registrant();
                    applied
                }
            };
            if applied {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_many(
        &self,
        kind: Option<RegistrantKind>,
        ids: &[Uuid],
    ) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| !in_scope(r, kind, ids));
        Ok((before - rows.len()) as u64)
    }

    async fn stats(&self) -> Result<RegistrationStats, StoreError> {
        Ok(RegistrationStats::from_registrants(
            self.rows.read().await.iter(),
        ))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryContentStore {
    items: RwLock<Vec<ContentItem>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create(&self, request: CreateContentRequest) -> Result<ContentItem, StoreError> {
        let item = ContentItem::from_new(request, Utc::now());
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.items.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn list(
        &self,
        kind: Option<ContentKind>,
        page: PageRequest,
    ) -> Result<Page<ContentItem>, StoreError> {
        let items = self.items.read().await;
        let matching: Vec<&ContentItem> = items
            .iter()
            .rev()
            .filter(|i| kind.map_or(true, |k| k == i.kind))
            .collect();
        Ok(paginate(matching, page))
    }

    async fn increment(
        &self,
        id: Uuid,
        counter: ContentCounter,
    ) -> Result<Option<ContentItem>, StoreError> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|i| i.id == id).map(|item| {
            item.bump(counter, Utc::now());
            item.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() < before)
    }

    async fn stats(&self) -> Result<ContentStats, StoreError> {
        Ok(ContentStats::from_items(self.items.read().await.iter()))
    }
}
