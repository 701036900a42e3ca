use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::features::categories::dtos::CategoryCandidate;
use crate::features::categories::models::Category;

/// Failures a category store can report. Callers match on the kind instead of
/// inspecting backend error codes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("category not found")]
    NotFound,

    #[error("category name is already taken")]
    DuplicateName,

    #[error("category was modified concurrently")]
    Conflict,

    #[error(transparent)]
    Unavailable(#[from] sqlx::Error),
}

/// Persistence gateway for categories.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All categories ordered by display order, then name. Read-only.
    async fn list_all(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, StoreError>;

    /// Case-insensitive name existence check; `exclude_id` skips the record
    /// being edited. Advisory only: the unique index stays authoritative for
    /// writes that race past this check.
    async fn exists_by_name_ci(
        &self,
        name: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, StoreError>;

    async fn insert(&self, candidate: &CategoryCandidate) -> Result<Category, StoreError>;

    /// Update `name` and `display_order`, guarded by the `updated_at` token
    /// read when the edit started. A token that no longer matches reports
    /// `Conflict`; a vanished row reports `NotFound`.
    async fn update(
        &self,
        id: i32,
        candidate: &CategoryCandidate,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Category, StoreError>;

    /// Remove by id; removing an absent id reports `NotFound`, so a repeated
    /// delete is safe for the caller.
    async fn remove(&self, id: i32) -> Result<(), StoreError>;
}

/// PostgreSQL-backed category store.
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// PostgreSQL unique_violation; the only unique index reachable from these
/// statements is the one on LOWER(name).
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            return StoreError::DuplicateName;
        }
    }
    StoreError::Unavailable(e)
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, display_order, created_at, updated_at
            FROM categories
            ORDER BY display_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, display_order, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn exists_by_name_ci(
        &self,
        name: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM categories
                WHERE LOWER(name) = LOWER($1)
                  AND ($2::integer IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, candidate: &CategoryCandidate) -> Result<Category, StoreError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, display_order)
            VALUES ($1, $2)
            RETURNING id, name, display_order, created_at, updated_at
            "#,
        )
        .bind(&candidate.name)
        .bind(candidate.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update(
        &self,
        id: i32,
        candidate: &CategoryCandidate,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Category, StoreError> {
        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, display_order = $2, updated_at = now()
            WHERE id = $3 AND updated_at = $4
            RETURNING id, name, display_order, created_at, updated_at
            "#,
        )
        .bind(&candidate.name)
        .bind(candidate.display_order)
        .bind(id)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match updated {
            Some(category) => Ok(category),
            // Zero rows: either the token is stale or the row is gone
            None => match self.find_by_id(id).await? {
                Some(_) => Err(StoreError::Conflict),
                None => Err(StoreError::NotFound),
            },
        }
    }

    async fn remove(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use chrono::Duration;

    use super::*;

    struct MemoryState {
        rows: BTreeMap<i32, Category>,
        next_id: i32,
    }

    /// In-memory store used by service and endpoint tests. Mirrors the
    /// Postgres behavior: case-insensitive unique names enforced on write,
    /// conditional update on the `updated_at` token, not-found on repeated
    /// removal.
    pub struct InMemoryCategoryStore {
        state: Mutex<MemoryState>,
        fail_next: AtomicBool,
    }

    impl InMemoryCategoryStore {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(MemoryState {
                    rows: BTreeMap::new(),
                    next_id: 1,
                }),
                fail_next: AtomicBool::new(false),
            }
        }

        /// Store pre-populated with the schema seed rows.
        pub fn seeded() -> Self {
            let store = Self::new();
            {
                let mut state = store.state.lock().unwrap();
                for (id, name) in [(1, "Action"), (2, "SciFi"), (3, "History")] {
                    let now = Utc::now();
                    state.rows.insert(
                        id,
                        Category {
                            id,
                            name: name.to_string(),
                            display_order: id,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
                state.next_id = 4;
            }
            store
        }

        /// Make the next store call fail as an unavailable backend.
        pub fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        fn check_available(&self) -> Result<(), StoreError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(StoreError::Unavailable(sqlx::Error::PoolClosed));
            }
            Ok(())
        }

        fn name_taken(state: &MemoryState, name: &str, exclude_id: Option<i32>) -> bool {
            state.rows.values().any(|c| {
                Some(c.id) != exclude_id && c.name.to_lowercase() == name.to_lowercase()
            })
        }

        /// Strictly-advancing timestamp; the wall clock may not tick between
        /// two steps of a test.
        fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
            let now = Utc::now();
            if now > previous {
                now
            } else {
                previous + Duration::microseconds(1)
            }
        }
    }

    #[async_trait]
    impl CategoryStore for InMemoryCategoryStore {
        async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
            self.check_available()?;
            let state = self.state.lock().unwrap();
            let mut categories: Vec<Category> = state.rows.values().cloned().collect();
            categories.sort_by(|a, b| {
                a.display_order
                    .cmp(&b.display_order)
                    .then_with(|| a.name.cmp(&b.name))
            });
            Ok(categories)
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<Category>, StoreError> {
            self.check_available()?;
            let state = self.state.lock().unwrap();
            Ok(state.rows.get(&id).cloned())
        }

        async fn exists_by_name_ci(
            &self,
            name: &str,
            exclude_id: Option<i32>,
        ) -> Result<bool, StoreError> {
            self.check_available()?;
            let state = self.state.lock().unwrap();
            Ok(Self::name_taken(&state, name, exclude_id))
        }

        async fn insert(&self, candidate: &CategoryCandidate) -> Result<Category, StoreError> {
            self.check_available()?;
            let mut state = self.state.lock().unwrap();
            if Self::name_taken(&state, &candidate.name, None) {
                return Err(StoreError::DuplicateName);
            }

            let id = state.next_id;
            state.next_id += 1;
            let now = Utc::now();
            let category = Category {
                id,
                name: candidate.name.clone(),
                display_order: candidate.display_order,
                created_at: now,
                updated_at: now,
            };
            state.rows.insert(id, category.clone());
            Ok(category)
        }

        async fn update(
            &self,
            id: i32,
            candidate: &CategoryCandidate,
            expected_updated_at: DateTime<Utc>,
        ) -> Result<Category, StoreError> {
            self.check_available()?;
            let mut state = self.state.lock().unwrap();
            if Self::name_taken(&state, &candidate.name, Some(id)) {
                return Err(StoreError::DuplicateName);
            }

            let Some(existing) = state.rows.get(&id).cloned() else {
                return Err(StoreError::NotFound);
            };
            if existing.updated_at != expected_updated_at {
                return Err(StoreError::Conflict);
            }

            let category = Category {
                name: candidate.name.clone(),
                display_order: candidate.display_order,
                updated_at: Self::touch(existing.updated_at),
                ..existing
            };
            state.rows.insert(id, category.clone());
            Ok(category)
        }

        async fn remove(&self, id: i32) -> Result<(), StoreError> {
            self.check_available()?;
            let mut state = self.state.lock().unwrap();
            if state.rows.remove(&id).is_none() {
                return Err(StoreError::NotFound);
            }
            Ok(())
        }
    }
}
