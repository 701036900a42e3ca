use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryCandidate, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::store::{CategoryStore, StoreError};
use crate::features::categories::validator::{
    duplicate_name_error, normalize_name, validate_candidate,
};

/// Command handlers for category management.
///
/// Every write follows normalize -> validate -> uniqueness check -> persist.
/// The uniqueness check is advisory; the store's unique index catches writes
/// that race past it, and both paths surface the same duplicate-name error.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// List all categories in display order, then by name.
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self
            .store
            .list_all()
            .await
            .map_err(|e| persistence_failure("list categories", e))?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Fetch one category; backs the edit and delete confirmation forms and
    /// hands out the `updated_at` token for a later update.
    pub async fn get(&self, id: i32) -> Result<CategoryResponseDto> {
        let category = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| persistence_failure("fetch category", e))?;

        category
            .map(|c| c.into())
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let candidate = CategoryCandidate {
            name: normalize_name(dto.name.as_deref()),
            display_order: dto.display_order,
        };

        if let Err(errors) = validate_candidate(&candidate) {
            return Err(AppError::validation(errors, &candidate));
        }

        let taken = self
            .store
            .exists_by_name_ci(&candidate.name, None)
            .await
            .map_err(|e| persistence_failure("check category name", e))?;
        if taken {
            return Err(AppError::validation(duplicate_name_error(), &candidate));
        }

        match self.store.insert(&candidate).await {
            Ok(category) => {
                tracing::info!("Category created: id={}, name={}", category.id, category.name);
                Ok(category.into())
            }
            // The advisory check lost the race; same error as a check hit
            Err(StoreError::DuplicateName) => {
                Err(AppError::validation(duplicate_name_error(), &candidate))
            }
            Err(e) => Err(persistence_failure("create category", e)),
        }
    }

    /// Update name and display order of an existing category. `path_id` is
    /// the id from the request path; a payload that disagrees is a caller
    /// bug, rejected before any validation.
    pub async fn update(&self, path_id: i32, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        if dto.id != path_id {
            return Err(AppError::BadRequest(
                "Category id in path and payload do not match".to_string(),
            ));
        }

        let candidate = CategoryCandidate {
            name: normalize_name(dto.name.as_deref()),
            display_order: dto.display_order,
        };

        if let Err(errors) = validate_candidate(&candidate) {
            return Err(AppError::validation(errors, &candidate));
        }

        let taken = self
            .store
            .exists_by_name_ci(&candidate.name, Some(path_id))
            .await
            .map_err(|e| persistence_failure("check category name", e))?;
        if taken {
            return Err(AppError::validation(duplicate_name_error(), &candidate));
        }

        let existing = self
            .store
            .find_by_id(path_id)
            .await
            .map_err(|e| persistence_failure("fetch category", e))?
            .ok_or_else(|| not_found(path_id))?;

        // Token from the edit fetch when the caller supplied one, otherwise
        // the row as read within this request
        let expected_updated_at = dto.updated_at.unwrap_or(existing.updated_at);

        match self
            .store
            .update(path_id, &candidate, expected_updated_at)
            .await
        {
            Ok(category) => {
                tracing::info!("Category updated: id={}, name={}", category.id, category.name);
                Ok(category.into())
            }
            Err(StoreError::Conflict) => Err(AppError::Conflict(
                "Category was modified by someone else; reload and try again".to_string(),
            )),
            Err(StoreError::NotFound) => Err(not_found(path_id)),
            Err(StoreError::DuplicateName) => {
                Err(AppError::validation(duplicate_name_error(), &candidate))
            }
            Err(e) => Err(persistence_failure("update category", e)),
        }
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        match self.store.remove(id).await {
            Ok(()) => {
                tracing::info!("Category deleted: id={}", id);
                Ok(())
            }
            Err(StoreError::NotFound) => Err(not_found(id)),
            Err(e) => Err(persistence_failure("delete category", e)),
        }
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Category {} not found", id))
}

fn persistence_failure(operation: &str, err: StoreError) -> AppError {
    tracing::error!("Failed to {}: {:?}", operation, err);
    match err {
        StoreError::Unavailable(e) => AppError::Database(e),
        other => AppError::Internal(other.to_string()),
    }
}
