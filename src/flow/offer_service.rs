use serde::Serialize;

use crate::catalog::SERVICE_CATEGORIES;
use crate::error::FlowError;
use crate::flow::{ensure_valid, require, verification::split_list};
use crate::models::{FieldErrors, User, UserType};
use crate::ui::RestrictedActionGate;

pub const OFFERING_SERVICES: &str = "offering services";
pub const MIN_DESCRIPTION_LEN: usize = 100;

pub const DELIVERY_OPTIONS: [&str; 7] = [
    "1 day", "2 days", "3 days", "1 week", "2 weeks", "3 weeks", "1 month",
];

#[derive(Debug, Clone)]
pub struct OfferServiceForm {
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub delivery_time: String,
    /// Comma separated
    pub tags: String,
    pub features: Vec<String>,
    pub requirements: String,
}

impl Default for OfferServiceForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            description: String::new(),
            price: String::new(),
            delivery_time: String::new(),
            tags: String::new(),
            features: vec![String::new(); 3],
            requirements: String::new(),
        }
    }
}

/// A validated service offer. There is no backend endpoint for offers yet,
/// so this is where the flow ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceOffer {
    pub title: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub delivery_time: String,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub requirements: Option<String>,
}

impl OfferServiceForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        require(&mut errors, "title", &self.title, "Service title is required");

        if self.category.trim().is_empty() {
            errors.insert("category".into(), "Category is required".into());
        } else if !SERVICE_CATEGORIES.contains(&self.category.trim()) {
            errors.insert("category".into(), "Unknown category".into());
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert("description".into(), "Service description is required".into());
        } else if description.chars().count() < MIN_DESCRIPTION_LEN {
            errors.insert(
                "description".into(),
                format!("Description must be at least {} characters", MIN_DESCRIPTION_LEN),
            );
        }

        if self.price.trim().is_empty() {
            errors.insert("price".into(), "Price is required".into());
        } else if parse_price(&self.price).is_none() {
            errors.insert("price".into(), "Price must be a valid positive number".into());
        }

        if self.delivery_time.trim().is_empty() {
            errors.insert("delivery_time".into(), "Delivery time is required".into());
        } else if !DELIVERY_OPTIONS.contains(&self.delivery_time.trim()) {
            errors.insert("delivery_time".into(), "Unknown delivery time".into());
        }

        require(&mut errors, "tags", &self.tags, "Tags are required");

        if self.features.iter().all(|f| f.trim().is_empty()) {
            errors.insert("features".into(), "At least one feature is required".into());
        }

        errors
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

/// Only verified freelancers may offer services; everyone else gets the
/// restricted-action interstitial.
pub fn can_offer_services(user: Option<&User>, gate: &mut RestrictedActionGate) -> bool {
    match user {
        Some(user) if user.user_type == UserType::Freelancer && user.is_verified => true,
        _ => {
            gate.show(OFFERING_SERVICES);
            false
        }
    }
}

pub fn submit_offer(
    user: Option<&User>,
    gate: &mut RestrictedActionGate,
    form: &OfferServiceForm,
) -> Result<ServiceOffer, FlowError> {
    if !can_offer_services(user, gate) {
        return Err(FlowError::Restricted(OFFERING_SERVICES.to_string()));
    }

    ensure_valid(form.validate())?;

    let requirements = form.requirements.trim();
    let offer = ServiceOffer {
        title: form.title.trim().to_string(),
        category: form.category.trim().to_string(),
        description: form.description.trim().to_string(),
        price: parse_price(&form.price).unwrap_or_default(),
        delivery_time: form.delivery_time.trim().to_string(),
        tags: split_list(&form.tags),
        features: form
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
        requirements: (!requirements.is_empty()).then(|| requirements.to_string()),
    };

    tracing::info!("service offer \"{}\" created", offer.title);
    Ok(offer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(user_type: &str, verified: bool) -> User {
        User::from_fragments(&json!({
            "id": 1,
            "first_name": "Ada",
            "last_name": "Obi",
            "email": "ada@example.com",
            "user_type": user_type,
            "is_verified": verified
        }))
        .unwrap()
    }

    fn valid_form() -> OfferServiceForm {
        OfferServiceForm {
            title: "I will build your Rust backend".into(),
            category: "Programming & Tech".into(),
            description: "x".repeat(120),
            price: "250".into(),
            delivery_time: "1 week".into(),
            tags: "rust, axum, api".into(),
            features: vec!["Source code".into(), "".into(), " Deployment ".into()],
            requirements: String::new(),
        }
    }

    #[test]
    fn only_verified_freelancers_get_in() {
        let mut gate = RestrictedActionGate::new();
        assert!(can_offer_services(Some(&user("freelancer", true)), &mut gate));
        assert!(!gate.is_open());

        assert!(!can_offer_services(Some(&user("freelancer", false)), &mut gate));
        assert_eq!(gate.feature(), OFFERING_SERVICES);

        gate.hide();
        assert!(!can_offer_services(Some(&user("client", true)), &mut gate));
        assert!(gate.is_open());
    }

    #[test]
    fn validation_messages() {
        let form = OfferServiceForm {
            description: "too short".into(),
            price: "-3".into(),
            ..OfferServiceForm::default()
        };
        let errors = form.validate();
        assert_eq!(errors["title"], "Service title is required");
        assert_eq!(errors["category"], "Category is required");
        assert_eq!(errors["description"], "Description must be at least 100 characters");
        assert_eq!(errors["price"], "Price must be a valid positive number");
        assert_eq!(errors["delivery_time"], "Delivery time is required");
        assert_eq!(errors["tags"], "Tags are required");
        assert_eq!(errors["features"], "At least one feature is required");
    }

    #[test]
    fn valid_offer_is_normalized() {
        let mut gate = RestrictedActionGate::new();
        let offer = submit_offer(Some(&user("freelancer", true)), &mut gate, &valid_form()).unwrap();
        assert_eq!(offer.price, 250.0);
        assert_eq!(offer.tags, vec!["rust", "axum", "api"]);
        assert_eq!(offer.features, vec!["Source code", "Deployment"]);
        assert_eq!(offer.requirements, None);
    }

    #[test]
    fn unverified_submission_is_restricted() {
        let mut gate = RestrictedActionGate::new();
        let err = submit_offer(Some(&user("freelancer", false)), &mut gate, &valid_form()).unwrap_err();
        assert!(matches!(err, FlowError::Restricted(_)));
        assert!(gate.is_open());
    }
}
