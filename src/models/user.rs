use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Version tag written next to every persisted user record.
pub const USER_SCHEMA_VERSION: u32 = 1;

/// Keys that carry the credential in backend responses, never profile data.
const TOKEN_KEYS: &[&str] = &["token", "key", "access", "access_token", "refresh"];

/// Field names owned by the core struct; they may not appear in `extra`.
const CORE_FIELDS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "user_type",
    "is_verified",
    "is_pending_review",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Freelancer,
    Client,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Freelancer => "freelancer",
            UserType::Client => "client",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freelancer" => Ok(UserType::Freelancer),
            "client" => Ok(UserType::Client),
            other => Err(format!("unknown user type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Verified,
    PendingReview,
    Unverified,
}

impl VerificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::PendingReview => "Under Review",
            VerificationStatus::Unverified => "Not Verified",
        }
    }
}

/// Authenticated user, flattened from the account and profile records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(alias = "role")]
    pub user_type: UserType,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_pending_review: bool,
    /// Role-specific attributes (skills, company_name, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid user id: {}", other))),
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedUser {
    version: u32,
    user: User,
}

impl User {
    /// Builds a user from a backend body holding `user` and `profile`
    /// fragments, or from a flat object.
    pub fn from_fragments(body: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(merge_fragments(body)))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn verification_status(&self) -> VerificationStatus {
        if self.is_verified {
            VerificationStatus::Verified
        } else if self.is_pending_review {
            VerificationStatus::PendingReview
        } else {
            VerificationStatus::Unverified
        }
    }

    /// Shallow merge: every field present in `patch` replaces the current value.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(is_verified) = patch.is_verified {
            self.is_verified = is_verified;
        }
        if let Some(is_pending_review) = patch.is_pending_review {
            self.is_pending_review = is_pending_review;
        }
        for (key, value) in patch.extra {
            if CORE_FIELDS.contains(&key.as_str()) {
                tracing::debug!("ignoring core field {} in extra attributes", key);
                continue;
            }
            self.extra.insert(key, value);
        }
    }

    /// Serialized, versioned form kept in durable storage
    pub fn to_record(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&PersistedUser {
            version: USER_SCHEMA_VERSION,
            user: self.clone(),
        })
    }

    /// Reads a stored record; unknown versions and garbage read as absent.
    pub fn from_record(raw: &str) -> Option<Self> {
        let persisted: PersistedUser = serde_json::from_str(raw).ok()?;
        (persisted.version == USER_SCHEMA_VERSION).then_some(persisted.user)
    }
}

/// Partial update for [`User`]; `id` and `user_type` are immutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_verified: Option<bool>,
    pub is_pending_review: Option<bool>,
    pub extra: Map<String, Value>,
}

impl UserPatch {
    pub fn attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Successful login body: credential plus profile fragments
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "key", alias = "access", alias = "access_token")]
    pub token: String,
    #[serde(flatten)]
    pub fragments: Map<String, Value>,
}

impl AuthResponse {
    pub fn user(&self) -> Result<User, serde_json::Error> {
        User::from_fragments(&Value::Object(self.fragments.clone()))
    }
}

/// Account fields first, then profile fields on top. A profile's own `id`
/// is kept as `profile_id` and its `user` back-reference is dropped.
pub fn merge_fragments(body: &Value) -> Map<String, Value> {
    let Some(root) = body.as_object() else {
        return Map::new();
    };

    let account = root.get("user").and_then(Value::as_object);
    let profile = root.get("profile").and_then(Value::as_object);

    if account.is_none() && profile.is_none() {
        return root
            .iter()
            .filter(|(key, _)| !TOKEN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
    }

    let mut merged = account.cloned().unwrap_or_default();
    if let Some(profile) = profile {
        for (key, value) in profile {
            match key.as_str() {
                "id" => {
                    merged.insert("profile_id".to_string(), value.clone());
                }
                "user" => {}
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }
    merged
}
