use crate::error::FlowError;
use crate::models::{Role, SignupPayload};
use crate::session::SessionStore;

/// A card on the role selection page
#[derive(Debug, Clone, Copy)]
pub struct RoleOption {
    pub role: Role,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

pub const ROLE_OPTIONS: [RoleOption; 2] = [
    RoleOption {
        role: Role::Freelancer,
        title: "I want to offer services",
        subtitle: "Freelancer",
        description: "Showcase your skills and find clients who need your expertise",
        features: &[
            "Create service offerings",
            "Build your portfolio",
            "Set your own rates",
            "Work with verified clients",
        ],
    },
    RoleOption {
        role: Role::Client,
        title: "I want to hire talent",
        subtitle: "Client",
        description: "Find and hire verified professionals for your projects",
        features: &[
            "Post job requirements",
            "Browse verified freelancers",
            "Manage projects",
            "Secure payments",
        ],
    },
];

pub fn role_option(role: Role) -> &'static RoleOption {
    match role {
        Role::Freelancer => &ROLE_OPTIONS[0],
        Role::Client => &ROLE_OPTIONS[1],
    }
}

/// Records the chosen role on the payload. Without a selection nothing is
/// written and the page stays put.
pub async fn select_role(
    session: &SessionStore,
    selected: Option<Role>,
) -> Result<SignupPayload, FlowError> {
    let role = selected.ok_or(FlowError::MissingRole)?;

    let payload = session
        .update_signup_payload(Some(SignupPayload::new().with_role(role)))
        .await?
        .unwrap_or_default();

    tracing::debug!("role {} selected; continuing to verification", role);
    Ok(payload)
}
