use crate::models::{User, UserType, VerificationStatus};
use crate::ui::RestrictedActionGate;

pub const CREATING_SERVICES: &str = "creating services";
pub const POSTING_JOBS: &str = "posting jobs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTile {
    pub title: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub greeting: String,
    pub subtitle: &'static str,
    pub status: VerificationStatus,
    pub stats: Vec<StatTile>,
    /// Gated action offered to this user type
    pub primary_action: &'static str,
    /// Shown while the account is not verified
    pub verification_prompt: Option<&'static str>,
}

pub fn dashboard_view(user: &User) -> DashboardView {
    let freelancer = user.user_type == UserType::Freelancer;
    let status = user.verification_status();

    let stats = vec![
        StatTile {
            title: if freelancer { "Active Services" } else { "Posted Jobs" },
            value: "0",
        },
        StatTile {
            title: if freelancer { "Total Earnings" } else { "Active Hires" },
            value: if freelancer { "₦0" } else { "0" },
        },
        StatTile {
            title: "Profile Views",
            value: "0",
        },
    ];

    let verification_prompt = match status {
        VerificationStatus::Verified => None,
        VerificationStatus::PendingReview => {
            Some("Your verification is under review. We'll notify you once it's complete.")
        }
        VerificationStatus::Unverified => {
            Some("Complete your verification to unlock all features.")
        }
    };

    DashboardView {
        greeting: format!("Welcome back, {}!", user.first_name),
        subtitle: if freelancer {
            "Manage your services and projects"
        } else {
            "Manage your job postings and hires"
        },
        status,
        stats,
        primary_action: if freelancer { CREATING_SERVICES } else { POSTING_JOBS },
        verification_prompt,
    }
}

/// Returns true when the user may proceed; otherwise opens the gate for
/// `feature`.
pub fn request_restricted_action(
    user: Option<&User>,
    gate: &mut RestrictedActionGate,
    feature: &str,
) -> bool {
    match user {
        Some(user) if user.is_verified => true,
        _ => {
            gate.show(feature);
            false
        }
    }
}
