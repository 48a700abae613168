// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request body helpers.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` so malformed bodies are
//! reported in the regular `{"error": ...}` shape rather than axum's
//! plain-text rejection.

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::ApiError;

/// Unwrap a JSON body, mapping deserialization failures to 400.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| ApiError::bad_request(err.body_text()))
}

/// Trimmed value of an optional text field, `None` when blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  a ".into())).as_deref(), Some("a"));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
