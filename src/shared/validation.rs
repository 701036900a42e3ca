use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

lazy_static! {
    /// Regex matching runs of whitespace, used to collapse user-supplied
    /// names before validation and storage
    /// - "  Board   Games  " -> "Board Games" (after trim)
    pub static ref WHITESPACE_RUN_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

/// Flatten field-tagged validation errors into "field: message" strings for
/// the response envelope. Falls back to the error code when a rule carries no
/// message. Sorted so the output is stable for callers and tests.
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut flattened: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    flattened.sort();
    flattened
}
