use crate::error::FlowError;
use crate::flow::{ensure_valid, is_valid_email, require};
use crate::models::{FieldErrors, SignupPayload};
use crate::session::SessionStore;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        require(&mut errors, "first_name", &self.first_name, "First name is required");
        require(&mut errors, "last_name", &self.last_name, "Last name is required");

        if self.email.trim().is_empty() {
            errors.insert("email".into(), "Email is required".into());
        } else if !is_valid_email(&self.email) {
            errors.insert("email".into(), "Email is invalid".into());
        }

        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password".into(),
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }

        if self.password != self.confirm_password {
            errors.insert("confirm_password".into(), "Passwords do not match".into());
        }

        errors
    }

    fn to_partial(&self) -> SignupPayload {
        SignupPayload::new()
            .with_field("first_name", self.first_name.trim())
            .with_field("last_name", self.last_name.trim())
            .with_field("email", self.email.trim())
            .with_field("password", self.password.as_str())
    }
}

/// First signup step: validates identity fields and merges them into the
/// payload. No backend call is made until verification.
pub async fn submit_signup(
    session: &SessionStore,
    form: &SignupForm,
) -> Result<SignupPayload, FlowError> {
    ensure_valid(form.validate())?;

    let payload = session
        .update_signup_payload(Some(form.to_partial()))
        .await?
        .unwrap_or_default();

    tracing::debug!("signup details saved; next step is role selection");
    Ok(payload)
}
