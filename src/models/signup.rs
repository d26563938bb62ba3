use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use crate::models::user::UserType as Role;

/// Per-field error messages, keyed by form field name. `form` holds errors
/// that belong to no single field.
pub type FieldErrors = BTreeMap<String, String>;

pub const FORM_ERROR_KEY: &str = "form";

/// Registration data accumulated across the signup pages
///
/// `role` is a discriminator for the submission endpoint and is never sent
/// to the backend. All other fields are merged shallowly, last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl SignupPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key == "role" {
            tracing::debug!("role must be set through with_role; ignoring field");
            return;
        }
        self.fields.insert(key, value.into());
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.fields.is_empty()
    }

    /// Shallow merge of `partial` into `self`. Values are replaced as a
    /// whole; lists are never concatenated.
    pub fn merge(&mut self, partial: SignupPayload) {
        if partial.role.is_some() {
            self.role = partial.role;
        }
        for (key, value) in partial.fields {
            self.fields.insert(key, value);
        }
    }

    /// Splits off the discriminator, leaving the body to submit.
    pub fn into_submission(self) -> (Option<Role>, Map<String, Value>) {
        (self.role, self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_is_last_write_wins_per_field() {
        let mut payload = SignupPayload::new()
            .with_field("email", "a@example.com")
            .with_field("skills", json!(["Rust"]));

        payload.merge(
            SignupPayload::new()
                .with_role(Role::Freelancer)
                .with_field("skills", json!(["Go"])),
        );
        payload.merge(SignupPayload::new().with_field("email", "b@example.com"));

        assert_eq!(payload.role, Some(Role::Freelancer));
        assert_eq!(payload.field("email"), Some(&json!("b@example.com")));
        assert_eq!(payload.field("skills"), Some(&json!(["Go"])));
    }

    #[test]
    fn merge_without_role_keeps_existing_role() {
        let mut payload = SignupPayload::new().with_role(Role::Client);
        payload.merge(SignupPayload::new().with_field("location", "Lagos"));
        assert_eq!(payload.role, Some(Role::Client));
    }

    #[test]
    fn role_cannot_be_smuggled_in_as_a_field() {
        let payload = SignupPayload::new().with_field("role", "client");
        assert!(payload.is_empty());
    }

    #[test]
    fn serializes_flat_with_role_discriminator() {
        let payload = SignupPayload::new()
            .with_role(Role::Client)
            .with_field("company_name", "Acme");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "role": "client", "company_name": "Acme" }));

        let back: SignupPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn submission_strips_role() {
        let payload = SignupPayload::new()
            .with_role(Role::Freelancer)
            .with_field("email", "a@example.com");
        let (role, body) = payload.into_submission();
        assert_eq!(role, Some(Role::Freelancer));
        assert!(!body.contains_key("role"));
        assert_eq!(body.get("email"), Some(&json!("a@example.com")));
    }
}
