//! Product category management for the storefront admin.
//!
//! Categories carry a unique display name and a positive display order used
//! to sort listings. Writes go through a normalize -> validate -> uniqueness
//! check -> persist pipeline; the store's unique index on the lowercased name
//! backs up the advisory check when concurrent writes race.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List categories ordered for display |
//! | POST | `/api/categories` | Create a category |
//! | GET | `/api/categories/{id}` | Fetch one category (edit/delete forms) |
//! | PUT | `/api/categories/{id}` | Update name and display order |
//! | DELETE | `/api/categories/{id}` | Delete a category |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod validator;

pub use services::CategoryService;
pub use store::PgCategoryStore;
