use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::categories::models::Category;

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    /// Display name; trimmed and internal whitespace collapsed before validation
    #[serde(default)]
    pub name: Option<String>,

    /// Position in category listings, must be greater than zero
    pub display_order: i32,
}

/// Request DTO for updating a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    /// Must match the id in the request path
    pub id: i32,

    #[serde(default)]
    pub name: Option<String>,

    pub display_order: i32,

    /// `updatedAt` as returned by the fetch that populated the edit form.
    /// A stale token makes the update fail with a conflict instead of
    /// silently overwriting a concurrent edit.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Normalized candidate values, echoed back to the caller when a write is
/// rejected so the submitted input is not lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCandidate {
    pub name: String,
    pub display_order: i32,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: i32,
    pub name: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    /// Concurrency token to send back with an update
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            display_order: c.display_order,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
