use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::AuthApi;
use crate::error::SessionError;
use crate::models::{AuthResponse, SignupPayload, User, UserPatch};
use crate::session::storage::{DurableStorage, SIGNUP_PAYLOAD_KEY, TOKEN_KEY, USER_KEY};

/// In-memory view of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub token: Option<String>,
    pub signup_payload: Option<SignupPayload>,
}

/// Who is logged in and which registration is in progress
///
/// Constructed once at startup and handed to every consumer. All state is
/// mirrored to [`DurableStorage`] so a restart restores it through
/// [`SessionStore::bootstrap`].
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn DurableStorage>,
    state: RwLock<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            api,
            storage,
            state: RwLock::new(SessionSnapshot::default()),
        }
    }

    pub fn api(&self) -> &Arc<dyn AuthApi> {
        &self.api
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn signup_payload(&self) -> Option<SignupPayload> {
        self.state.read().await.signup_payload.clone()
    }

    /// Restores the signup payload, then validates any stored credential
    /// against the backend. A failed profile fetch clears the whole session,
    /// and so does storage that can no longer be read.
    pub async fn bootstrap(&self) -> Result<(), SessionError> {
        let payload = self.load_signup_payload();
        self.state.write().await.signup_payload = payload;

        let Some(token) = self.read_entry(TOKEN_KEY) else {
            debug!("no stored credential; starting signed out");
            self.clear_session().await;
            return Ok(());
        };

        match self.api.profile(&token).await {
            Ok(user) => {
                self.storage.set(USER_KEY, &encode_user(&user)?)?;
                let mut state = self.state.write().await;
                state.user = Some(user);
                state.token = Some(token);
                state.is_authenticated = true;
                info!("session restored");
                Ok(())
            }
            Err(err) => {
                warn!("stored session is no longer valid: {}", err);
                self.clear_session().await;
                Ok(())
            }
        }
    }

    /// Installs the user and credential from a successful login and drops
    /// any in-progress signup.
    pub async fn sign_in(&self, response: AuthResponse) -> Result<User, SessionError> {
        let user = response
            .user()
            .map_err(|e| SessionError::Decode(e.to_string()))?;

        self.storage.set(USER_KEY, &encode_user(&user)?)?;
        self.storage.set(TOKEN_KEY, &response.token)?;
        self.storage.remove(SIGNUP_PAYLOAD_KEY)?;

        let mut state = self.state.write().await;
        state.user = Some(user.clone());
        state.token = Some(response.token);
        state.is_authenticated = true;
        state.signup_payload = None;

        info!("signed in as {}", user.email);
        Ok(user)
    }

    /// Notifies the backend if a credential exists, then clears the session
    /// locally whatever the backend said.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let token = match self.state.read().await.token.clone() {
            Some(token) => Some(token),
            None => self.read_entry(TOKEN_KEY),
        };

        if let Some(token) = token {
            if let Err(err) = self.api.logout(&token).await {
                warn!("backend logout failed, clearing session anyway: {}", err);
            }
        }

        self.clear_session().await;
        info!("signed out");
        Ok(())
    }

    /// `None` deletes the payload. `Some(partial)` shallow-merges into the
    /// current payload (creating one if absent) and persists the result.
    pub async fn update_signup_payload(
        &self,
        partial: Option<SignupPayload>,
    ) -> Result<Option<SignupPayload>, SessionError> {
        let mut state = self.state.write().await;

        let Some(partial) = partial else {
            state.signup_payload = None;
            self.storage.remove(SIGNUP_PAYLOAD_KEY)?;
            return Ok(None);
        };

        let mut merged = state.signup_payload.clone().unwrap_or_default();
        merged.merge(partial);

        let encoded =
            serde_json::to_string(&merged).map_err(|e| SessionError::Decode(e.to_string()))?;
        self.storage.set(SIGNUP_PAYLOAD_KEY, &encoded)?;

        state.signup_payload = Some(merged.clone());
        Ok(Some(merged))
    }

    /// Shallow-merges `patch` into the current user; no-op when signed out.
    pub async fn update_user(&self, patch: UserPatch) -> Result<Option<User>, SessionError> {
        let mut state = self.state.write().await;
        let Some(current) = state.user.as_ref() else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.apply(patch);
        self.storage.set(USER_KEY, &encode_user(&updated)?)?;

        state.user = Some(updated.clone());
        Ok(Some(updated))
    }

    /// Never fails: memory is always cleared, storage as far as it can be.
    async fn clear_session(&self) {
        {
            let mut state = self.state.write().await;
            state.user = None;
            state.token = None;
            state.is_authenticated = false;
        }

        self.discard(USER_KEY);
        self.discard(TOKEN_KEY);
    }

    fn load_signup_payload(&self) -> Option<SignupPayload> {
        let raw = self.read_entry(SIGNUP_PAYLOAD_KEY)?;

        match serde_json::from_str(&raw) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!("discarding unreadable signup payload: {}", err);
                self.discard(SIGNUP_PAYLOAD_KEY);
                None
            }
        }
    }

    /// Reads one entry. Unreadable storage is wiped and reads as absent.
    fn read_entry(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("session storage is unreadable, resetting it: {}", err);
                self.reset_storage();
                None
            }
        }
    }

    fn discard(&self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            warn!("could not remove {} from session storage: {}", key, err);
            self.reset_storage();
        }
    }

    fn reset_storage(&self) {
        if let Err(err) = self.storage.reset() {
            warn!("could not reset session storage: {}", err);
        }
    }
}

fn encode_user(user: &User) -> Result<String, SessionError> {
    user.to_record()
        .map_err(|e| SessionError::Decode(e.to_string()))
}
