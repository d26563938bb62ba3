use serde_json::{Map, Value};

use crate::error::FlowError;
use crate::flow::{ensure_valid, flow_error_from_client, require};
use crate::models::{FieldErrors, Role, SignupPayload};
use crate::session::SessionStore;

/// Raw verification inputs; only the fields for the payload's role are read.
#[derive(Debug, Clone, Default)]
pub struct VerificationForm {
    // Freelancer
    pub skills: String,
    pub github_profile: String,
    pub portfolio_links: String,
    pub experience_description: String,
    pub education: String,

    // Client
    pub company_name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// Registration accepted; the account awaits review and the user signs
    /// in separately.
    PendingReview { role: Role, response: Value },
}

impl VerificationForm {
    pub fn validate(&self, role: Role) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match role {
            Role::Freelancer => {
                require(&mut errors, "skills", &self.skills, "Skills are required");
                require(
                    &mut errors,
                    "experience_description",
                    &self.experience_description,
                    "Experience description is required",
                );
            }
            Role::Client => {
                require(
                    &mut errors,
                    "company_name",
                    &self.company_name,
                    "Company name is required",
                );
                require(&mut errors, "location", &self.location, "Location is required");
            }
        }
        errors
    }

    fn role_fields(&self, role: Role) -> SignupPayload {
        match role {
            Role::Freelancer => SignupPayload::new()
                .with_field("skills", split_list(&self.skills))
                .with_field("github_profile", self.github_profile.trim())
                .with_field("portfolio_links", split_list(&self.portfolio_links))
                .with_field("experience_description", self.experience_description.trim())
                .with_field("education", self.education.trim()),
            Role::Client => SignupPayload::new()
                .with_field("company_name", self.company_name.trim())
                .with_field("location", self.location.trim()),
        }
    }
}

/// Splits comma or newline separated input into trimmed, non-empty items,
/// keeping their order.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Final submission body: accumulated payload plus role fields, without the
/// `role` discriminator.
pub fn build_submission(
    payload: SignupPayload,
    form: &VerificationForm,
) -> Result<(Role, Map<String, Value>), FlowError> {
    let role = payload.role.ok_or(FlowError::MissingRole)?;

    let mut merged = payload;
    merged.merge(form.role_fields(role));
    let (_, body) = merged.into_submission();
    Ok((role, body))
}

/// Validates, posts to the role's signup route and deletes the payload on
/// success. On failure the payload is kept and the errors are returned.
pub async fn submit_verification(
    session: &SessionStore,
    form: &VerificationForm,
) -> Result<VerificationOutcome, FlowError> {
    let payload = session
        .signup_payload()
        .await
        .ok_or(FlowError::MissingRole)?;
    let role = payload.role.ok_or(FlowError::MissingRole)?;

    ensure_valid(form.validate(role))?;

    let (role, body) = build_submission(payload, form)?;
    let response = session
        .api()
        .signup(role, &body)
        .await
        .map_err(flow_error_from_client)?;

    session.update_signup_payload(None).await?;
    tracing::info!("{} registration submitted for review", role);

    Ok(VerificationOutcome::PendingReview { role, response })
}
