use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

use crate::features::categories::dtos::CategoryCandidate;
use crate::shared::validation::WHITESPACE_RUN_REGEX;

/// One message for the duplicate-name case, whether the advisory pre-write
/// check caught it or the store's unique index did.
pub const DUPLICATE_NAME_MESSAGE: &str = "A category with this name already exists";

/// Trim a raw category name and collapse internal whitespace runs to single
/// spaces. Absent input maps to the empty string.
pub fn normalize_name(raw: Option<&str>) -> String {
    match raw {
        Some(value) => WHITESPACE_RUN_REGEX
            .replace_all(value.trim(), " ")
            .into_owned(),
        None => String::new(),
    }
}

/// Business rules for a normalized category candidate. Pure; uniqueness is
/// checked separately against the store.
pub fn validate_candidate(candidate: &CategoryCandidate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if candidate.name.is_empty() {
        errors.add("name".into(), field_error("required", "Name is required"));
    }

    if candidate.display_order <= 0 {
        errors.add(
            "display_order".into(),
            field_error("range", "Display order must be greater than zero"),
        );
    }

    // Numeric names that match the order value confuse sorted listings
    if !candidate.name.is_empty()
        && candidate
            .name
            .eq_ignore_ascii_case(&candidate.display_order.to_string())
    {
        errors.add(
            "name".into(),
            field_error(
                "name_matches_display_order",
                "The name cannot exactly match the display order",
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Field-tagged duplicate-name error set, on `name` like the other rules.
pub fn duplicate_name_error() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "name".into(),
        field_error("duplicate", DUPLICATE_NAME_MESSAGE),
    );
    errors
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
