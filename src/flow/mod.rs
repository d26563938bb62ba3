//! Page flows: signup → choose role → verification → dashboard, plus
//! sign-in, service offers and the explore catalog filters.

pub mod dashboard;
pub mod offer_service;
pub mod role;
pub mod signin;
pub mod signup;
pub mod verification;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ClientError, FlowError};
use crate::models::{FieldErrors, FORM_ERROR_KEY};

pub const GENERIC_FORM_ERROR: &str = "An unexpected error occurred. Please try again.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Records `message` under `field` when `value` is blank.
pub(crate) fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), message.to_string());
    }
}

pub(crate) fn ensure_valid(errors: FieldErrors) -> Result<(), FlowError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FlowError::Invalid(errors))
    }
}

/// Maps a backend error body onto form errors
///
/// Accepts `{field: "msg"}` and `{field: ["msg", ...]}`; the first message
/// wins. `non_field_errors`, `detail` and `message` land under `form`.
pub fn field_errors_from_body(body: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let Some(map) = body.as_object() else {
        errors.insert(FORM_ERROR_KEY.to_string(), GENERIC_FORM_ERROR.to_string());
        return errors;
    };

    for (key, value) in map {
        let message = match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.iter().find_map(|item| item.as_str().map(str::to_string)),
            _ => None,
        };
        let Some(message) = message else { continue };

        let field = match key.as_str() {
            "non_field_errors" | "detail" | "message" | "error" => FORM_ERROR_KEY,
            other => other,
        };
        errors.entry(field.to_string()).or_insert(message);
    }

    if errors.is_empty() {
        errors.insert(FORM_ERROR_KEY.to_string(), GENERIC_FORM_ERROR.to_string());
    }
    errors
}

/// Backend rejections become field errors; anything else is a generic
/// form error, logged here.
pub(crate) fn flow_error_from_client(err: ClientError) -> FlowError {
    match err {
        ClientError::Rejected { body, .. } => FlowError::Invalid(field_errors_from_body(&body)),
        other => {
            tracing::error!("request failed: {}", other);
            let mut errors = FieldErrors::new();
            errors.insert(FORM_ERROR_KEY.to_string(), GENERIC_FORM_ERROR.to_string());
            FlowError::Invalid(errors)
        }
    }
}
